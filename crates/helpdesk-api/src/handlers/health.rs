//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::warn;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
///
/// `503` when the database cannot be reached.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let database = match state.reference_store.health_check().await {
        Ok(true) => true,
        Ok(false) => false,
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            false
        }
    };
    let storage = state.storage.health_check().await.unwrap_or(false);

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = HealthResponse {
        status: if database && storage { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if database { "connected" } else { "unreachable" }.to_string(),
        storage: if storage { "available" } else { "unavailable" }.to_string(),
    };
    (status, Json(ApiResponse::ok(body)))
}
