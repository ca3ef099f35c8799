//! `AuthUser` extractor: resolves the bearer credential to a request context.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use helpdesk_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller available in handlers.
///
/// The role is re-read from the user store on every request, never taken
/// from the token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let authorization = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let identity = state.resolver.resolve(authorization).await?;
        Ok(AuthUser(RequestContext::new(identity)))
    }
}
