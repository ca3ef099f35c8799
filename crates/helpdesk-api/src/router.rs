//! Route definitions for the helpdesk HTTP API.
//!
//! All routes are mounted under `/api`.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Multipart framing allowance on top of the file payloads.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let attachments = &state.config.attachments;
    let max_body = attachments.max_files_per_upload * attachments.max_file_size_bytes as usize
        + MULTIPART_OVERHEAD_BYTES;
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    let api_routes = Router::new()
        .merge(health_routes())
        .merge(auth_routes())
        .merge(ticket_routes())
        .merge(attachment_routes())
        .merge(dashboard_routes())
        .merge(reference_routes())
        .merge(company_routes())
        .merge(user_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::cors::build_cors_layer(&state.config.server.cors))
                .layer(axum_middleware::from_fn(middleware::logging::request_logging))
                .layer(axum_middleware::from_fn_with_state(
                    state.clone(),
                    middleware::rate_limit::rate_limit,
                ))
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Login and token verification
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/verify", get(handlers::auth::verify))
}

/// Ticket CRUD
fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tickets",
            get(handlers::ticket::list_tickets).post(handlers::ticket::create_ticket),
        )
        .route(
            "/tickets/{id}",
            get(handlers::ticket::get_ticket)
                .put(handlers::ticket::update_ticket)
                .delete(handlers::ticket::delete_ticket),
        )
}

/// Ticket attachments
fn attachment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tickets/{id}/files",
            get(handlers::attachment::list_files).post(handlers::attachment::upload_files),
        )
        .route(
            "/files/{id}/download",
            get(handlers::attachment::download_file),
        )
        .route("/files/{id}", delete(handlers::attachment::delete_file))
}

fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard/stats", get(handlers::dashboard::stats))
}

/// Lookup tables
fn reference_routes() -> Router<AppState> {
    Router::new()
        .route("/modules", get(handlers::reference::modules))
        .route("/statuses", get(handlers::reference::statuses))
        .route("/priorities", get(handlers::reference::priorities))
}

/// Company administration
fn company_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/companies",
            get(handlers::company::list_companies).post(handlers::company::create_company),
        )
        .route(
            "/companies/{id}",
            put(handlers::company::update_company).delete(handlers::company::delete_company),
        )
}

/// User administration and the support-user picker
fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(handlers::user::list_users).post(handlers::user::create_user),
        )
        .route("/users/support", get(handlers::user::list_support_users))
}
