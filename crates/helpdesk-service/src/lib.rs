//! # helpdesk-service
//!
//! Business logic service layer for the helpdesk. Each service combines
//! the store traits, the attachment byte store and the RBAC enforcer to
//! implement one group of use cases.
//!
//! Dependencies are injected at construction time as `Arc`s.

pub mod attachment;
pub mod auth;
pub mod company;
pub mod context;
pub mod dashboard;
pub mod reference;
pub mod ticket;
pub mod user;

pub use attachment::{AttachmentService, IncomingFile};
pub use auth::{AuthService, LoginResult};
pub use company::CompanyService;
pub use context::RequestContext;
pub use dashboard::{DashboardService, DashboardStats};
pub use reference::ReferenceService;
pub use ticket::TicketService;
pub use user::{NewUserRequest, UserService};
