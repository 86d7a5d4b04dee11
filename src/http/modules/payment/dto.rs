//! Wallet top-up request/response bodies.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct TopupRequest {
    pub user_id: i64,
    #[validate(custom(function = "validate_topup_amount"))]
    pub amount: Decimal,
    /// Free-text hint (e.g. "bank_transfer"); the actual settlement path is
    /// chosen by `gateway_name`, so this is accepted but not otherwise used.
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub gateway_name: Option<String>,
}

/// RM 1.00 .. RM 500.00 per transaction.
fn validate_topup_amount(amount: &Decimal) -> Result<(), validator::ValidationError> {
    if *amount < Decimal::new(100, 2) || *amount > Decimal::new(50000, 2) {
        return Err(validator::ValidationError::new("amount must be between RM 1.00 and RM 500.00"));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct TopupResponse {
    pub transaction_ref: String,
    pub payment_url: Option<String>,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    pub processed: bool,
}

#[derive(Debug, Serialize)]
pub struct ApproveResponse {
    pub transaction_ref: String,
    pub status: String,
}

pub type CallbackPayload = Value;
