//! Support ticket request/response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::ticket::{TicketCategory, TicketPriority, TicketStatus};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTicketRequest {
    pub category: TicketCategory,
    pub priority: TicketPriority,
    #[validate(length(min = 1, max = 200))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub message: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TransitionTicketRequest {
    pub status: TicketStatus,
}

#[derive(Debug, Serialize)]
pub struct TicketSummary {
    pub id: i64,
    pub ticket_number: String,
    pub user_id: i64,
    pub category: String,
    pub department: String,
    pub priority: String,
    pub status: String,
    pub subject: String,
    pub assigned_staff_id: Option<i64>,
    pub due_at: DateTime<Utc>,
    pub escalated: bool,
    pub created_at: DateTime<Utc>,
}

impl From<crate::infrastructure::database::entities::ticket::Model> for TicketSummary {
    fn from(t: crate::infrastructure::database::entities::ticket::Model) -> Self {
        Self {
            id: t.id,
            ticket_number: t.ticket_number,
            user_id: t.user_id,
            category: t.category,
            department: t.department,
            priority: t.priority,
            status: t.status,
            subject: t.subject,
            assigned_staff_id: t.assigned_staff_id,
            due_at: t.due_at,
            escalated: t.escalated,
            created_at: t.created_at,
        }
    }
}
