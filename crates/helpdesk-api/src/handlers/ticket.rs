//! Ticket handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use validator::Validate;

use helpdesk_auth::Permission;
use helpdesk_core::error::AppError;
use helpdesk_entity::ticket::TicketDetail;

use crate::dto::request::{CreateTicketRequest, UpdateTicketRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::json::{parse_json, violations};
use crate::extractors::{AuthUser, IdPath};
use crate::state::AppState;

/// GET /api/tickets
pub async fn list_tickets(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<TicketDetail>>>> {
    let tickets = state.ticket_service.list(&auth).await?;
    Ok(Json(ApiResponse::ok(tickets)))
}

/// GET /api/tickets/{id}
pub async fn get_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<TicketDetail>>> {
    let ticket = state.ticket_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(ticket)))
}

/// POST /api/tickets
///
/// Callers who may not create tickets get `403` whatever the body holds.
pub async fn create_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<ApiResponse<TicketDetail>>)> {
    state.rbac.require(&auth.identity, Permission::CreateTicket)?;
    let req: CreateTicketRequest = parse_json(&body)?;
    let company_required = state.rbac.has(&auth.identity, Permission::ChooseCompany);
    let invalid = req.violations(company_required);
    if !invalid.is_empty() {
        return Err(AppError::invalid_fields(invalid).into());
    }

    let ticket = state
        .ticket_service
        .create(&auth, req.into_draft()?)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(ticket))))
}

/// PUT /api/tickets/{id}
///
/// Callers who may not update tickets get `403` whatever the body holds.
pub async fn update_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    body: Bytes,
) -> ApiResult<Json<ApiResponse<TicketDetail>>> {
    state.rbac.require(&auth.identity, Permission::UpdateTicket)?;
    let req: UpdateTicketRequest = parse_json(&body)?;
    req.validate().map_err(violations)?;

    let ticket = state
        .ticket_service
        .update(&auth, id, req.into_update()?)
        .await?;
    Ok(Json(ApiResponse::ok(ticket)))
}

/// DELETE /api/tickets/{id}
pub async fn delete_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.ticket_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Ticket deleted"))))
}
