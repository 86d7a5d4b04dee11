//! Ticket routing vocabulary: categories, departments, priorities, the SLA
//! hours table, and the category-to-department routing table.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketCategory {
    Billing,
    Hardware,
    ChargingIssue,
    AccountAccess,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Finance,
    FieldOps,
    Support,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    WaitingOnCustomer,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TicketStatus::Resolved | TicketStatus::Closed)
    }

    /// Valid forward transitions. A reopen (`Resolved`/`Closed` -> `Open`)
    /// is handled separately by the ticket engine, not as a generic
    /// transition, since it also resets the SLA clock.
    pub fn can_transition_to(self, next: TicketStatus) -> bool {
        use TicketStatus::*;
        matches!(
            (self, next),
            (Open, InProgress)
                | (Open, WaitingOnCustomer)
                | (Open, Resolved)
                | (InProgress, WaitingOnCustomer)
                | (InProgress, Resolved)
                | (WaitingOnCustomer, InProgress)
                | (WaitingOnCustomer, Resolved)
                | (Resolved, Closed)
        )
    }
}

pub fn department_for_category(category: TicketCategory) -> Department {
    match category {
        TicketCategory::Billing => Department::Finance,
        TicketCategory::Hardware | TicketCategory::ChargingIssue => Department::FieldOps,
        TicketCategory::AccountAccess | TicketCategory::General => Department::Support,
    }
}

pub fn sla_hours(priority: TicketPriority) -> i64 {
    match priority {
        TicketPriority::Urgent => 4,
        TicketPriority::High => 12,
        TicketPriority::Medium => 24,
        TicketPriority::Low => 48,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_routing_matches_table() {
        assert_eq!(department_for_category(TicketCategory::Billing), Department::Finance);
        assert_eq!(department_for_category(TicketCategory::Hardware), Department::FieldOps);
        assert_eq!(department_for_category(TicketCategory::ChargingIssue), Department::FieldOps);
        assert_eq!(department_for_category(TicketCategory::AccountAccess), Department::Support);
        assert_eq!(department_for_category(TicketCategory::General), Department::Support);
    }

    #[test]
    fn sla_hours_matches_table() {
        assert_eq!(sla_hours(TicketPriority::Urgent), 4);
        assert_eq!(sla_hours(TicketPriority::High), 12);
        assert_eq!(sla_hours(TicketPriority::Medium), 24);
        assert_eq!(sla_hours(TicketPriority::Low), 48);
    }

    #[test]
    fn resolved_tickets_cannot_jump_back_to_in_progress_directly() {
        assert!(!TicketStatus::Resolved.can_transition_to(TicketStatus::InProgress));
        assert!(TicketStatus::Resolved.can_transition_to(TicketStatus::Closed));
    }
}
