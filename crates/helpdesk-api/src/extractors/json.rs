//! JSON body extraction and `validator` error mapping.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use helpdesk_core::error::{AppError, FieldViolation};

use crate::error::ApiError;

/// A deserialized and validated JSON body.
///
/// Malformed JSON and rule violations both become `400` validation errors;
/// every violated field is reported.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;
        value.validate().map_err(violations)?;
        Ok(ValidJson(value))
    }
}

/// Deserialize a raw JSON body, for handlers that must authorize before
/// looking at the payload. Malformed JSON is a validation error.
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::validation(format!("Invalid JSON body: {e}")))
}

/// Flatten `validator` errors into field violations, ordered by field name.
pub fn field_violations(errors: ValidationErrors) -> Vec<FieldViolation> {
    let mut list: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid"));
                FieldViolation::new(field.to_string(), message)
            })
        })
        .collect();
    list.sort_by(|a, b| a.field.cmp(&b.field));
    list
}

/// [`field_violations`] as a validation error.
pub fn violations(errors: ValidationErrors) -> AppError {
    AppError::invalid_fields(field_violations(errors))
}
