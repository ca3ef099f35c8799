//! Lookup table handlers.

use axum::Json;
use axum::extract::State;

use helpdesk_entity::reference::LookupEntry;

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/modules
pub async fn modules(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<LookupEntry>>>> {
    Ok(Json(ApiResponse::ok(state.reference_service.modules(&auth).await?)))
}

/// GET /api/statuses
pub async fn statuses(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<LookupEntry>>>> {
    Ok(Json(ApiResponse::ok(state.reference_service.statuses(&auth).await?)))
}

/// GET /api/priorities
pub async fn priorities(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<LookupEntry>>>> {
    Ok(Json(ApiResponse::ok(state.reference_service.priorities(&auth).await?)))
}
