//! Charging session lifecycle.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created by RemoteStartTransaction before the charger has confirmed a
    /// real transaction id. `transaction_id <= 0` while in this state.
    Pending,
    Active,
    Completed,
    /// Closed by the reconciliation sweep rather than a StopTransaction --
    /// the charger went idle without ever confirming the session.
    Abandoned,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Abandoned)
    }
}

/// A session with this placeholder id has not yet been confirmed by a real
/// StartTransaction.transactionId from the charger.
pub const PLACEHOLDER_TRANSACTION_ID: i64 = 0;

pub fn is_placeholder(transaction_id: i64) -> bool {
    transaction_id <= PLACEHOLDER_TRANSACTION_ID
}
