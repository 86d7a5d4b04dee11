use chrono::Utc;
use rust_ocpp::v1_6::messages::start_transaction::StartTransactionResponse;
use rust_ocpp::v1_6::types::{AuthorizationStatus, IdTagInfo};
use serde_json::Value;
use tracing::{error, info};

use super::HandlerContext;

pub async fn handle(ctx: &HandlerContext, charge_point_id: &str, payload: Value) -> Value {
    // The wire payload here proposes its own `transactionId` rather than
    // leaving assignment to the CSMS, so it's read off the raw JSON instead
    // of `rust_ocpp`'s upstream `StartTransactionRequest` (which has no such
    // field -- assignment is normally a CSMS responsibility).
    let connector_id = payload.get("connectorId").and_then(Value::as_i64).unwrap_or(1) as i32;
    let id_tag = payload.get("idTag").and_then(Value::as_str).unwrap_or("").to_string();
    let meter_start = payload.get("meterStart").and_then(Value::as_i64).unwrap_or(0);
    let transaction_id = payload.get("transactionId").and_then(Value::as_i64).unwrap_or(0);
    let timestamp = payload.get("timestamp").and_then(Value::as_str).and_then(|s| s.parse().ok()).unwrap_or_else(Utc::now);

    info!(charge_point_id, connector_id, id_tag = id_tag.as_str(), meter_start, transaction_id, "StartTransaction");

    match ctx.session_engine.on_start_transaction(charge_point_id, connector_id, &id_tag, meter_start, transaction_id, timestamp).await {
        Ok(session) => {
            let response = StartTransactionResponse {
                transaction_id: session.transaction_id as i32,
                id_tag_info: IdTagInfo { status: AuthorizationStatus::Accepted, expiry_date: None, parent_id_tag: None },
            };
            serde_json::to_value(&response).unwrap_or_default()
        }
        Err(e) => {
            error!(charge_point_id, error = %e, "failed to record StartTransaction");
            let response = StartTransactionResponse {
                transaction_id: transaction_id as i32,
                id_tag_info: IdTagInfo { status: AuthorizationStatus::Invalid, expiry_date: None, parent_id_tag: None },
            };
            serde_json::to_value(&response).unwrap_or_default()
        }
    }
}
