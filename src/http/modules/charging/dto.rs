//! Charging session request/response bodies.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct StartChargingRequest {
    #[validate(length(min = 1))]
    pub charger_id: String,
    pub connector_id: i32,
    #[validate(length(min = 1))]
    pub id_tag: String,
}

#[derive(Debug, Serialize)]
pub struct StartChargingResponse {
    pub session_id: i64,
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StopChargingRequest {
    pub transaction_id: Option<i64>,
    pub charger_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StopChargingResponse {
    pub accepted: bool,
    pub best_effort: bool,
}

#[derive(Debug, Serialize)]
pub struct ChargerSummary {
    pub charge_point_id: String,
    pub vendor: String,
    pub model: String,
    pub availability: String,
    pub connected: bool,
}
