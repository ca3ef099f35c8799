//! Auth handlers: login and verify.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, header};

use helpdesk_entity::user::UserProfile;

use crate::dto::request::LoginRequest;
use crate::dto::response::{ApiResponse, LoginResponse};
use crate::error::ApiResult;
use crate::extractors::ValidJson;
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<Json<ApiResponse<LoginResponse>>> {
    let result = state
        .auth_service
        .login(req.username.trim(), &req.password)
        .await?;
    Ok(Json(ApiResponse::ok(result.into())))
}

/// GET /api/auth/verify
pub async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<ApiResponse<UserProfile>>> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let profile = state.auth_service.verify(authorization).await?;
    Ok(Json(ApiResponse::ok(profile)))
}
