use rust_ocpp::v1_6::messages::meter_values::{MeterValuesRequest, MeterValuesResponse};
use rust_ocpp::v1_6::types::Measurand;
use serde_json::Value;
use tracing::{error, info};

use super::HandlerContext;

pub async fn handle(ctx: &HandlerContext, charge_point_id: &str, payload: Value) -> Value {
    let req: MeterValuesRequest = match serde_json::from_value(payload) {
        Ok(r) => r,
        Err(e) => {
            error!(charge_point_id, error = %e, "failed to parse MeterValues");
            return serde_json::json!({});
        }
    };

    info!(charge_point_id, connector_id = req.connector_id, transaction_id = ?req.transaction_id, samples = req.meter_value.len(), "MeterValues");

    let readings_wh: Vec<i64> = req
        .meter_value
        .iter()
        .flat_map(|mv| &mv.sampled_value)
        .filter(|sv| matches!(sv.measurand, None | Some(Measurand::EnergyActiveImportRegister)))
        .filter_map(|sv| sv.value.parse::<f64>().ok())
        .map(|wh| wh.round() as i64)
        .collect();

    let recorded_at = req.meter_value.first().map(|mv| mv.timestamp).unwrap_or_else(chrono::Utc::now);

    if !readings_wh.is_empty() {
        if let Err(e) = ctx
            .session_engine
            .on_meter_values(charge_point_id, req.connector_id, req.transaction_id.map(|t| t as i64), &readings_wh, recorded_at)
            .await
        {
            error!(charge_point_id, error = %e, "failed to record MeterValues");
        }
    }

    serde_json::to_value(&MeterValuesResponse {}).unwrap_or_default()
}
