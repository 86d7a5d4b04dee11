//! Ticket routing: numbering, department routing, SLA due dates,
//! least-loaded auto-assignment, and status transitions.

use std::sync::Arc;

use chrono::Duration;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder, Set};
use tracing::{info, warn};

use crate::clock::Clock;
use crate::domain::ticket::{department_for_category, sla_hours, Department, TicketCategory, TicketPriority, TicketStatus};
use crate::error::{EngineError, EngineResult};
use crate::infrastructure::database::entities::{support_staff, ticket, ticket_message, user};
use crate::infrastructure::database::store::Store;
use crate::mailer::Mailer;

pub struct TicketEngine {
    store: Store,
    clock: Arc<dyn Clock>,
    mailer: Arc<dyn Mailer>,
    reminder_cooldown_hours: i64,
}

impl TicketEngine {
    pub fn new(store: Store, clock: Arc<dyn Clock>, mailer: Arc<dyn Mailer>) -> Self {
        Self { store, clock, mailer, reminder_cooldown_hours: 4 }
    }

    /// Looks up the email for a staff row's underlying user account. Missing
    /// accounts are logged and skipped rather than failing the caller's
    /// request -- a notification failure must never block ticket routing.
    async fn staff_email(&self, staff: &support_staff::Model) -> Option<String> {
        match user::Entity::find_by_id(staff.user_id).one(&self.store.db).await {
            Ok(Some(u)) => Some(u.email),
            Ok(None) => {
                warn!(staff_id = staff.id, user_id = staff.user_id, "assigned staff has no user account, skipping notification");
                None
            }
            Err(e) => {
                warn!(staff_id = staff.id, error = %e, "failed to look up staff email");
                None
            }
        }
    }

    fn ticket_number(&self, sequence: i64) -> String {
        let today = self.clock.now().format("%Y%m%d");
        format!("TKT-{today}-{sequence:04}")
    }

    async fn next_sequence_today(&self) -> EngineResult<i64> {
        let prefix = format!("TKT-{}-", self.clock.now().format("%Y%m%d"));
        let count = ticket::Entity::find()
            .filter(ticket::Column::TicketNumber.starts_with(&prefix))
            .count(&self.store.db)
            .await?;
        Ok(count as i64 + 1)
    }

    pub async fn create_ticket(&self, user_id: i64, category: TicketCategory, priority: TicketPriority, subject: &str, initial_message: &str) -> EngineResult<ticket::Model> {
        let now = self.clock.now();
        let department = department_for_category(category);
        let due_at = now + Duration::hours(sla_hours(priority));
        let sequence = self.next_sequence_today().await?;
        let ticket_number = self.ticket_number(sequence);

        let assignee = self.pick_assignee(department, priority).await?;

        let am = ticket::ActiveModel {
            ticket_number: Set(ticket_number.clone()),
            user_id: Set(user_id),
            category: Set(serde_json::to_value(category).unwrap().as_str().unwrap().to_string()),
            department: Set(serde_json::to_value(department).unwrap().as_str().unwrap().to_string()),
            priority: Set(serde_json::to_value(priority).unwrap().as_str().unwrap().to_string()),
            status: Set(serde_json::to_value(TicketStatus::Open).unwrap().as_str().unwrap().to_string()),
            subject: Set(subject.to_string()),
            assigned_staff_id: Set(assignee.map(|s| s.id)),
            due_at: Set(due_at),
            last_reminder_at: Set(None),
            escalated: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            resolved_at: Set(None),
            ..Default::default()
        };
        let ticket = am.insert(&self.store.db).await?;

        let message = ticket_message::ActiveModel {
            ticket_id: Set(ticket.id),
            author_user_id: Set(Some(user_id)),
            body: Set(initial_message.to_string()),
            is_system: Set(false),
            created_at: Set(now),
            ..Default::default()
        };
        message.insert(&self.store.db).await?;

        if let Some(staff) = &assignee {
            let mut staff_am: support_staff::ActiveModel = staff.clone().into();
            staff_am.open_ticket_count = Set(staff.open_ticket_count + 1);
            staff_am.update(&self.store.db).await?;

            let routing_note = ticket_message::ActiveModel {
                ticket_id: Set(ticket.id),
                author_user_id: Set(None),
                body: Set(format!("Routed to {:?} department, assigned to staff #{}", department, staff.id)),
                is_system: Set(true),
                created_at: Set(now),
                ..Default::default()
            };
            routing_note.insert(&self.store.db).await?;

            if let Some(email) = self.staff_email(staff).await {
                self.mailer
                    .send(
                        &email,
                        &format!("New ticket assigned: {ticket_number}"),
                        &format!("Ticket {ticket_number} ({priority:?} priority, {department:?}) has been assigned to you.\n\n{initial_message}"),
                    )
                    .await;
            }
        }

        info!(ticket_number = ticket_number.as_str(), ?department, ?priority, "ticket created");
        Ok(ticket)
    }

    /// Picks the active staff member in `department` with the fewest open
    /// tickets. Urgent/high priority restricts the pool to managers when
    /// any manager is available.
    async fn pick_assignee(&self, department: Department, priority: TicketPriority) -> EngineResult<Option<support_staff::Model>> {
        let dept_str = serde_json::to_value(department).unwrap().as_str().unwrap().to_string();
        let mut query = support_staff::Entity::find()
            .filter(support_staff::Column::Department.eq(dept_str))
            .filter(support_staff::Column::IsActive.eq(true));

        if matches!(priority, TicketPriority::Urgent | TicketPriority::High) {
            let managers = query.clone().filter(support_staff::Column::IsManager.eq(true)).order_by(support_staff::Column::OpenTicketCount, Order::Asc).one(&self.store.db).await?;
            if managers.is_some() {
                return Ok(managers);
            }
        }

        query = query.order_by(support_staff::Column::OpenTicketCount, Order::Asc);
        Ok(query.one(&self.store.db).await?)
    }

    pub async fn transition_status(&self, ticket_id: i64, next: TicketStatus) -> EngineResult<ticket::Model> {
        let ticket = ticket::Entity::find_by_id(ticket_id).one(&self.store.db).await?.ok_or_else(|| EngineError::not_found("ticket", ticket_id.to_string()))?;
        let current = parse_status(&ticket.status);
        if !current.can_transition_to(next) {
            return Err(EngineError::Conflict(format!("cannot move ticket from {current:?} to {next:?}")));
        }

        let now = self.clock.now();
        let mut am: ticket::ActiveModel = ticket.into();
        am.status = Set(serde_json::to_value(next).unwrap().as_str().unwrap().to_string());
        am.updated_at = Set(now);
        if next.is_terminal() {
            am.resolved_at = Set(Some(now));
        }
        Ok(am.update(&self.store.db).await?)
    }

    /// Periodic sweep: escalates priority and logs a reminder message on
    /// every open ticket past its SLA due date, respecting a cooldown so
    /// the same ticket isn't re-escalated every tick.
    pub async fn run_sla_sweep(&self) -> EngineResult<usize> {
        let now = self.clock.now();
        let overdue = ticket::Entity::find()
            .filter(ticket::Column::Status.is_in(["open", "in_progress", "waiting_on_customer"]))
            .filter(ticket::Column::DueAt.lt(now))
            .all(&self.store.db)
            .await?;

        let mut touched = 0usize;
        for t in overdue {
            let due_for_reminder = match t.last_reminder_at {
                Some(last) => (now - last) >= Duration::hours(self.reminder_cooldown_hours),
                None => true,
            };
            if !due_for_reminder {
                continue;
            }

            let ticket_id = t.id;
            let was_escalated = t.escalated;
            let ticket_number = t.ticket_number.clone();
            let assigned_staff_id = t.assigned_staff_id;
            let mut am: ticket::ActiveModel = t.into();
            am.last_reminder_at = Set(Some(now));
            am.escalated = Set(true);
            am.update(&self.store.db).await?;

            let note = ticket_message::ActiveModel {
                ticket_id: Set(ticket_id),
                author_user_id: Set(None),
                body: Set("SLA breach reminder sent to assigned staff".to_string()),
                is_system: Set(true),
                created_at: Set(now),
                ..Default::default()
            };
            note.insert(&self.store.db).await?;

            if !was_escalated {
                warn!(ticket_id, "ticket breached SLA, escalating");
            }

            if let Some(staff_id) = assigned_staff_id {
                if let Ok(Some(staff)) = support_staff::Entity::find_by_id(staff_id).one(&self.store.db).await {
                    if let Some(email) = self.staff_email(&staff).await {
                        self.mailer
                            .send(&email, &format!("SLA breach: ticket {ticket_number}"), &format!("Ticket {ticket_number} is past its SLA due date and needs attention."))
                            .await;
                    }
                }
            }

            touched += 1;
        }
        Ok(touched)
    }
}

fn parse_status(raw: &str) -> TicketStatus {
    serde_json::from_value(serde_json::Value::String(raw.to_string())).unwrap_or(TicketStatus::Open)
}
