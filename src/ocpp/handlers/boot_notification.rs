use rust_ocpp::v1_6::messages::boot_notification::{BootNotificationRequest, BootNotificationResponse};
use rust_ocpp::v1_6::types::RegistrationStatus;
use serde_json::Value;
use tracing::{error, info};

use super::HandlerContext;

pub async fn handle(ctx: &HandlerContext, charge_point_id: &str, payload: Value) -> Value {
    let req: BootNotificationRequest = match serde_json::from_value(payload) {
        Ok(r) => r,
        Err(e) => {
            error!(charge_point_id, error = %e, "failed to parse BootNotification");
            return serde_json::json!({});
        }
    };

    info!(charge_point_id, vendor = req.charge_point_vendor.as_str(), model = req.charge_point_model.as_str(), "BootNotification");

    let interval = match ctx
        .session_engine
        .on_boot_notification(charge_point_id, &req.charge_point_vendor, &req.charge_point_model, req.charge_point_serial_number.clone(), req.firmware_version.clone())
        .await
    {
        Ok(interval) => interval,
        Err(e) => {
            error!(charge_point_id, error = %e, "failed to record BootNotification");
            300
        }
    };

    let response = BootNotificationResponse { current_time: chrono::Utc::now(), interval: interval as i32, status: RegistrationStatus::Accepted };
    serde_json::to_value(&response).unwrap_or_default()
}
