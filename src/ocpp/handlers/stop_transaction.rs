use rust_ocpp::v1_6::messages::stop_transaction::{StopTransactionRequest, StopTransactionResponse};
use rust_ocpp::v1_6::types::{AuthorizationStatus, IdTagInfo};
use serde_json::Value;
use tracing::{error, info};

use super::HandlerContext;

pub async fn handle(ctx: &HandlerContext, charge_point_id: &str, payload: Value) -> Value {
    let req: StopTransactionRequest = match serde_json::from_value(payload) {
        Ok(r) => r,
        Err(e) => {
            error!(charge_point_id, error = %e, "failed to parse StopTransaction");
            return serde_json::json!({});
        }
    };

    info!(charge_point_id, transaction_id = req.transaction_id, meter_stop = req.meter_stop, "StopTransaction");

    let reason = req.reason.as_ref().and_then(|r| serde_json::to_value(r).ok()).and_then(|v| v.as_str().map(str::to_string));

    if let Err(e) = ctx
        .session_engine
        .on_stop_transaction(req.transaction_id as i64, req.meter_stop as i64, reason, req.timestamp)
        .await
    {
        error!(charge_point_id, transaction_id = req.transaction_id, error = %e, "failed to record StopTransaction");
    }

    let response = StopTransactionResponse { id_tag_info: Some(IdTagInfo { status: AuthorizationStatus::Accepted, expiry_date: None, parent_id_tag: None }) };
    serde_json::to_value(&response).unwrap_or_default()
}
