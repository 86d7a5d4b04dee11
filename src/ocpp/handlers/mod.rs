//! Inbound OCPP 1.6 action handlers. Each handler deserializes into the
//! typed `rust_ocpp` request, calls into the session engine, and always
//! returns a CALLRESULT payload -- internal failures are logged, never
//! surfaced as CALLERROR, per the gateway's wire contract.

mod boot_notification;
mod heartbeat;
mod meter_values;
mod start_transaction;
mod status_notification;
mod stop_transaction;

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::error;

use crate::engines::SessionEngine;

pub struct HandlerContext {
    pub session_engine: Arc<SessionEngine>,
}

pub async fn handle_call(ctx: &HandlerContext, charge_point_id: &str, action: &str, payload: Value) -> Value {
    match action {
        "BootNotification" => boot_notification::handle(ctx, charge_point_id, payload).await,
        "Heartbeat" => heartbeat::handle(ctx, charge_point_id, payload).await,
        "StatusNotification" => status_notification::handle(ctx, charge_point_id, payload).await,
        "StartTransaction" => start_transaction::handle(ctx, charge_point_id, payload).await,
        "StopTransaction" => stop_transaction::handle(ctx, charge_point_id, payload).await,
        "MeterValues" => meter_values::handle(ctx, charge_point_id, payload).await,
        other => {
            error!(charge_point_id, action = other, "no inbound handler for this action");
            json!({})
        }
    }
}
