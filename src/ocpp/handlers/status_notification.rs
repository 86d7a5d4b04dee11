use rust_ocpp::v1_6::messages::status_notification::{StatusNotificationRequest, StatusNotificationResponse};
use serde_json::Value;
use tracing::{error, info};

use super::HandlerContext;

pub async fn handle(ctx: &HandlerContext, charge_point_id: &str, payload: Value) -> Value {
    let req: StatusNotificationRequest = match serde_json::from_value(payload) {
        Ok(r) => r,
        Err(e) => {
            error!(charge_point_id, error = %e, "failed to parse StatusNotification");
            return serde_json::json!({});
        }
    };

    info!(charge_point_id, connector_id = req.connector_id, status = ?req.status, error_code = ?req.error_code, "StatusNotification");

    let status_str = serde_json::to_value(&req.status).ok().and_then(|v| v.as_str().map(str::to_string)).unwrap_or_else(|| "Unavailable".to_string());
    let error_code_str = serde_json::to_value(&req.error_code).ok().and_then(|v| v.as_str().map(str::to_string)).unwrap_or_else(|| "NoError".to_string());

    if let Err(e) = ctx
        .session_engine
        .on_status_notification(charge_point_id, req.connector_id, &status_str, &error_code_str, req.info.clone())
        .await
    {
        error!(charge_point_id, error = %e, "failed to record StatusNotification");
    }

    serde_json::to_value(&StatusNotificationResponse {}).unwrap_or_default()
}
