//! Ticket creation and role-scoped listing.
//!
//! Visibility rule: admins see every ticket, managers see their own
//! department's tickets, staff see only tickets assigned to them, and a
//! caller with no `support_staff` row sees only tickets they opened.

use std::sync::Arc;

use axum::extract::{Extension, Path, State};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use super::dto::{CreateTicketRequest, TicketSummary, TransitionTicketRequest};
use crate::auth::middleware::AuthenticatedUser;
use crate::engines::ticket_engine::TicketEngine;
use crate::error::EngineError;
use crate::http::common::{ApiError, ApiResponse, ValidatedJson};
use crate::infrastructure::database::entities::{support_staff, ticket};

type JsonResult<T> = Result<axum::Json<ApiResponse<T>>, ApiError>;

#[derive(Clone)]
pub struct TicketsState {
    pub db: DatabaseConnection,
    pub ticket_engine: Arc<TicketEngine>,
}

pub async fn create_ticket(
    State(state): State<TicketsState>,
    Extension(caller): Extension<AuthenticatedUser>,
    ValidatedJson(body): ValidatedJson<CreateTicketRequest>,
) -> JsonResult<TicketSummary> {
    let ticket = state.ticket_engine.create_ticket(caller.user_id, body.category, body.priority, &body.subject, &body.message).await.map_err(ApiError::from)?;
    Ok(axum::Json(ApiResponse::success(ticket.into())))
}

async fn caller_staff_row(db: &DatabaseConnection, caller: &AuthenticatedUser) -> Result<Option<support_staff::Model>, EngineError> {
    support_staff::Entity::find().filter(support_staff::Column::UserId.eq(caller.user_id)).one(db).await.map_err(EngineError::from)
}

pub async fn list_tickets(State(state): State<TicketsState>, Extension(caller): Extension<AuthenticatedUser>) -> JsonResult<Vec<TicketSummary>> {
    let mut query = ticket::Entity::find();

    if !caller.is_admin {
        match caller_staff_row(&state.db, &caller).await? {
            Some(staff) if staff.is_manager => {
                query = query.filter(ticket::Column::Department.eq(staff.department));
            }
            Some(staff) => {
                query = query.filter(ticket::Column::AssignedStaffId.eq(staff.id));
            }
            None => {
                query = query.filter(ticket::Column::UserId.eq(caller.user_id));
            }
        }
    }

    let tickets = query.all(&state.db).await.map_err(EngineError::from)?;
    Ok(axum::Json(ApiResponse::success(tickets.into_iter().map(TicketSummary::from).collect())))
}

async fn authorize_ticket_access(state: &TicketsState, caller: &AuthenticatedUser, t: &ticket::Model) -> Result<(), EngineError> {
    if caller.is_admin || t.user_id == caller.user_id {
        return Ok(());
    }
    match caller_staff_row(&state.db, caller).await? {
        Some(staff) if staff.is_manager && staff.department == t.department => Ok(()),
        Some(staff) if t.assigned_staff_id == Some(staff.id) => Ok(()),
        _ => Err(EngineError::Forbidden("not authorized to view this ticket".into())),
    }
}

pub async fn get_ticket(State(state): State<TicketsState>, Extension(caller): Extension<AuthenticatedUser>, Path(ticket_id): Path<i64>) -> JsonResult<TicketSummary> {
    let t = ticket::Entity::find_by_id(ticket_id).one(&state.db).await.map_err(EngineError::from)?.ok_or_else(|| EngineError::not_found("ticket", ticket_id.to_string()))?;
    authorize_ticket_access(&state, &caller, &t).await?;
    Ok(axum::Json(ApiResponse::success(t.into())))
}

pub async fn transition_ticket(
    State(state): State<TicketsState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(ticket_id): Path<i64>,
    ValidatedJson(body): ValidatedJson<TransitionTicketRequest>,
) -> JsonResult<TicketSummary> {
    let t = ticket::Entity::find_by_id(ticket_id).one(&state.db).await.map_err(EngineError::from)?.ok_or_else(|| EngineError::not_found("ticket", ticket_id.to_string()))?;
    if !caller.is_admin {
        let staff = caller_staff_row(&state.db, &caller).await?.ok_or_else(|| EngineError::Forbidden("not authorized to update this ticket".into()))?;
        let allowed = (staff.is_manager && staff.department == t.department) || t.assigned_staff_id == Some(staff.id);
        if !allowed {
            return Err(EngineError::Forbidden("not authorized to update this ticket".into()).into());
        }
    }

    let updated = state.ticket_engine.transition_status(ticket_id, body.status).await.map_err(ApiError::from)?;
    Ok(axum::Json(ApiResponse::success(updated.into())))
}
