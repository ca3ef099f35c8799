//! Application builder: wires stores, services and the router together.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tracing::{info, warn};

use helpdesk_auth::{IdentityResolver, JwtDecoder, JwtEncoder, PasswordHasher, RbacEnforcer};
use helpdesk_core::config::AppConfig;
use helpdesk_core::error::AppError;
use helpdesk_core::traits::storage::StorageProvider;
use helpdesk_database::Stores;
use helpdesk_service::{
    AttachmentService, AuthService, CompanyService, DashboardService, ReferenceService,
    TicketService, UserService,
};

use crate::middleware::RateLimiter;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the shared state from configuration, stores and the byte store.
pub fn build_state(
    config: AppConfig,
    stores: Stores,
    storage: Arc<dyn StorageProvider>,
) -> AppState {
    let operation_timeout = Duration::from_secs(config.database.operation_timeout_seconds);

    let password_hasher = Arc::new(PasswordHasher::new());
    let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
    let resolver = Arc::new(IdentityResolver::new(
        JwtDecoder::new(&config.auth),
        Arc::clone(&stores.users),
    ));
    let rbac = Arc::new(RbacEnforcer::new());

    let ticket_service = TicketService::new(&stores, Arc::clone(&rbac), operation_timeout);
    let attachment_service = AttachmentService::new(
        Arc::clone(&stores.attachments),
        ticket_service.clone(),
        Arc::clone(&storage),
        Arc::clone(&rbac),
        config.attachments.clone(),
    );
    let dashboard_service =
        DashboardService::new(Arc::clone(&stores.tickets), Arc::clone(&rbac), operation_timeout);
    let auth_service = AuthService::new(
        Arc::clone(&stores.users),
        Arc::clone(&password_hasher),
        jwt_encoder,
        Arc::clone(&resolver),
    );
    let reference_service = ReferenceService::new(Arc::clone(&stores.reference), Arc::clone(&rbac));
    let company_service = CompanyService::new(Arc::clone(&stores.companies), Arc::clone(&rbac));
    let user_service = UserService::new(
        Arc::clone(&stores.users),
        Arc::clone(&stores.companies),
        password_hasher,
        Arc::clone(&rbac),
        config.auth.password_min_length,
    );

    AppState {
        rate_limiter: RateLimiter::from_config(&config.rate_limit),
        config: Arc::new(config),
        reference_store: stores.reference,
        storage,
        resolver,
        rbac,
        auth_service: Arc::new(auth_service),
        ticket_service: Arc::new(ticket_service),
        attachment_service: Arc::new(attachment_service),
        dashboard_service: Arc::new(dashboard_service),
        reference_service: Arc::new(reference_service),
        company_service: Arc::new(company_service),
        user_service: Arc::new(user_service),
    }
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the helpdesk server until Ctrl+C.
pub async fn run_server(
    config: AppConfig,
    stores: Stores,
    storage: Arc<dyn StorageProvider>,
) -> Result<(), AppError> {
    let bootstrap_password = config.auth.bootstrap_admin_password.clone();
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = build_state(config, stores, storage);

    match bootstrap_password.as_deref() {
        Some(password) if !password.is_empty() => {
            state.auth_service.bootstrap_admin(password).await?;
        }
        _ => info!("No bootstrap admin password configured; skipping admin bootstrap"),
    }

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(address = %addr, "Helpdesk server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    info!("Helpdesk server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C; shutting down");
    }
}
