//! Outbound OCPP command request/response bodies.
//!
//! Each admin-only command gets its own endpoint and its own request shape,
//! the way the teacher's `commands` module does -- a single generic
//! "send any action" endpoint would bypass per-action validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ResetRequest {
    #[validate(custom(function = "validate_reset_type"))]
    #[serde(rename = "type")]
    pub reset_type: String,
}

fn validate_reset_type(value: &str) -> Result<(), validator::ValidationError> {
    match value {
        "Hard" | "Soft" => Ok(()),
        _ => Err(validator::ValidationError::new("reset type must be \"Hard\" or \"Soft\"")),
    }
}

#[derive(Debug, Deserialize)]
pub struct UnlockConnectorRequest {
    pub connector_id: i32,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub accepted: bool,
    pub raw_status: Option<String>,
}
