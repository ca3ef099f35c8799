//! User administration handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use helpdesk_entity::user::UserProfile;

use crate::dto::request::CreateUserRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidJson};
use crate::state::AppState;

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<UserProfile>>>> {
    let users = state.user_service.list(&auth).await?;
    Ok(Json(ApiResponse::ok(users)))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<UserProfile>>)> {
    let user = state.user_service.create(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user))))
}

/// GET /api/users/support
pub async fn list_support_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<UserProfile>>>> {
    let users = state.user_service.list_support(&auth).await?;
    Ok(Json(ApiResponse::ok(users)))
}
