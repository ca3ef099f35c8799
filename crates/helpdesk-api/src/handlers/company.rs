//! Company administration handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use helpdesk_entity::company::{Company, CompanySummary};

use crate::dto::request::CompanyRequest;
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, IdPath, ValidJson};
use crate::state::AppState;

/// GET /api/companies
pub async fn list_companies(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<CompanySummary>>>> {
    let companies = state.company_service.list(&auth).await?;
    Ok(Json(ApiResponse::ok(companies)))
}

/// POST /api/companies
pub async fn create_company(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CompanyRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Company>>)> {
    let company = state.company_service.create(&auth, &req.name).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(company))))
}

/// PUT /api/companies/{id}
pub async fn update_company(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    ValidJson(req): ValidJson<CompanyRequest>,
) -> ApiResult<Json<ApiResponse<Company>>> {
    let company = state.company_service.update(&auth, id, &req.name).await?;
    Ok(Json(ApiResponse::ok(company)))
}

/// DELETE /api/companies/{id}
pub async fn delete_company(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.company_service.deactivate(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Company deactivated"))))
}
