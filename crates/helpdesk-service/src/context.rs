//! Request context carrying the resolved caller identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use helpdesk_auth::Identity;
use helpdesk_entity::user::Role;

/// Context for the current authenticated request.
///
/// Built by the API layer from the bearer credential and passed into
/// service methods so that every operation knows who is acting and which
/// instant counts as "now" for timestamps it writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The resolved caller.
    pub identity: Identity,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context stamped with the current time.
    pub fn new(identity: Identity) -> Self {
        Self::at(identity, Utc::now())
    }

    /// Creates a context with an explicit request time.
    pub fn at(identity: Identity, request_time: DateTime<Utc>) -> Self {
        Self {
            identity,
            request_time,
        }
    }

    pub fn user_id(&self) -> i64 {
        self.identity.user_id
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        self.identity.is_admin()
    }
}
