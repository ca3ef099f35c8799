//! Request DTOs with validation.
//!
//! Field names are snake_case; the camelCase spellings used by the web
//! client are accepted as aliases.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use helpdesk_core::error::{AppError, FieldViolation};
use helpdesk_entity::ticket::{Priority, TicketDraft, TicketStatus, TicketUpdate};
use helpdesk_service::user::NewUserRequest;

use crate::extractors::json::field_violations;

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Username is required"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Create ticket request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTicketRequest {
    /// Required for admins; ignored for customers.
    #[serde(default, alias = "companyId")]
    #[validate(range(min = 1, message = "company_id must be a positive integer"))]
    pub company_id: Option<i64>,
    #[serde(default, alias = "moduleId")]
    #[validate(
        required(message = "module_id is required"),
        range(min = 1, message = "module_id must be a positive integer")
    )]
    pub module_id: Option<i32>,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Subject is required"))]
    pub subject: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Description is required"))]
    pub description: String,
    #[serde(default, alias = "mailContent")]
    pub mail_content: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "priorityId")]
    #[validate(range(min = 1, max = 4, message = "priority_id must be between 1 and 4"))]
    pub priority_id: Option<i32>,
    #[serde(default, alias = "assignedTo")]
    #[validate(range(min = 1, message = "assigned_to must be a positive integer"))]
    pub assigned_to: Option<i64>,
    #[serde(default, alias = "dueDate")]
    pub due_date: Option<DueDate>,
}

impl CreateTicketRequest {
    /// Every violated rule of the body, ordered by field name.
    ///
    /// `company_required` is set for callers who pick the company
    /// themselves; for everyone else it is filled in from the caller.
    pub fn violations(&self, company_required: bool) -> Vec<FieldViolation> {
        let mut list = self.validate().err().map(field_violations).unwrap_or_default();
        if company_required && self.company_id.is_none() {
            list.push(FieldViolation::new("company_id", "company_id is required"));
            list.sort_by(|a, b| a.field.cmp(&b.field));
        }
        list
    }

    /// Convert a validated request into a draft.
    pub fn into_draft(self) -> Result<TicketDraft, AppError> {
        let module_id = self
            .module_id
            .ok_or_else(|| AppError::validation("module_id is required"))?;
        let priority_id = match self.priority_id {
            Some(id) => Priority::from_id(id)
                .ok_or_else(|| AppError::validation(format!("Unknown priority {id}")))?,
            None => Priority::default(),
        };
        Ok(TicketDraft {
            company_id: self.company_id,
            module_id,
            subject: self.subject.trim().to_string(),
            description: self.description.trim().to_string(),
            mail_content: non_blank(self.mail_content),
            email: non_blank(self.email),
            priority_id,
            assigned_to: self.assigned_to,
            due_date: self.due_date.map(|d| d.0),
        })
    }
}

/// Update ticket request. Omitted fields keep their current value;
/// an explicit `null` clears `assigned_to` or `due_date`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTicketRequest {
    #[serde(default, alias = "statusId")]
    #[validate(range(min = 1, max = 8, message = "status_id must be between 1 and 8"))]
    pub status_id: Option<i32>,
    #[serde(default, alias = "priorityId")]
    #[validate(range(min = 1, max = 4, message = "priority_id must be between 1 and 4"))]
    pub priority_id: Option<i32>,
    #[serde(default, alias = "assignedTo", deserialize_with = "double_option")]
    pub assigned_to: Option<Option<i64>>,
    #[serde(default, alias = "dueDate", deserialize_with = "double_option")]
    pub due_date: Option<Option<DueDate>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl UpdateTicketRequest {
    /// Convert a validated request into a domain update.
    pub fn into_update(self) -> Result<TicketUpdate, AppError> {
        let status_id = self
            .status_id
            .map(|id| {
                TicketStatus::from_id(id)
                    .ok_or_else(|| AppError::validation(format!("Unknown status {id}")))
            })
            .transpose()?;
        let priority_id = self
            .priority_id
            .map(|id| {
                Priority::from_id(id)
                    .ok_or_else(|| AppError::validation(format!("Unknown priority {id}")))
            })
            .transpose()?;
        if matches!(self.assigned_to, Some(Some(id)) if id <= 0) {
            return Err(AppError::invalid_fields(vec![FieldViolation::new(
                "assigned_to",
                "assigned_to must be a positive integer",
            )]));
        }
        Ok(TicketUpdate {
            status_id,
            priority_id,
            assigned_to: self.assigned_to,
            due_date: self.due_date.map(|d| d.map(|d| d.0)),
            notes: self.notes,
        })
    }
}

/// Create or rename a company.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CompanyRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Company name is required"))]
    pub name: String,
}

/// Create user request (admin).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[serde(default, alias = "fullName")]
    #[validate(custom(function = "not_blank", message = "Full name is required"))]
    pub full_name: String,
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Username is required"),
        length(max = 100, message = "Username is too long")
    )]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, alias = "roleId")]
    #[validate(required(message = "role_id is required"))]
    pub role_id: Option<i32>,
    #[serde(default, alias = "companyId")]
    #[validate(range(min = 1, message = "company_id must be a positive integer"))]
    pub company_id: Option<i64>,
}

impl From<CreateUserRequest> for NewUserRequest {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            full_name: req.full_name,
            username: req.username,
            password: req.password,
            role_id: req.role_id.unwrap_or_default(),
            company_id: req.company_id,
        }
    }
}

/// A due date given either as RFC 3339 or as a plain `YYYY-MM-DD` date
/// (midnight UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueDate(pub DateTime<Utc>);

impl DueDate {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self(dt.with_timezone(&Utc)));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| Self(dt.and_utc()))
    }
}

impl<'de> Deserialize<'de> for DueDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid due date `{raw}`, expected RFC 3339 or YYYY-MM-DD"
            ))
        })
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`). Use with `#[serde(default)]`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("Value is required")));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
