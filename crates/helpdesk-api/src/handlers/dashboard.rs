//! Dashboard handler.

use axum::Json;
use axum::extract::State;

use helpdesk_service::DashboardStats;

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/dashboard/stats
pub async fn stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<DashboardStats>>> {
    let stats = state.dashboard_service.stats(&auth).await?;
    Ok(Json(ApiResponse::ok(stats)))
}
