//! # helpdesk-api
//!
//! HTTP API layer for the helpdesk built on Axum.
//!
//! Provides the REST endpoints, middleware (rate limiting, CORS, logging),
//! extractors, DTOs and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, run_server};
pub use state::AppState;
