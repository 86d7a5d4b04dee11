use rust_ocpp::v1_6::messages::heartbeat::HeartbeatResponse;
use serde_json::Value;
use tracing::error;

use super::HandlerContext;

pub async fn handle(ctx: &HandlerContext, charge_point_id: &str, _payload: Value) -> Value {
    let current_time = match ctx.session_engine.on_heartbeat(charge_point_id).await {
        Ok(now) => now,
        Err(e) => {
            error!(charge_point_id, error = %e, "failed to record Heartbeat");
            chrono::Utc::now()
        }
    };
    serde_json::to_value(&HeartbeatResponse { current_time }).unwrap_or_default()
}
