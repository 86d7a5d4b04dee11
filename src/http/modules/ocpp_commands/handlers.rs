//! Admin-only outbound OCPP commands. Every route here sits behind
//! `admin_middleware` -- spec.md: "Admin-only: all OCPP remote operations".

use axum::extract::{Path, State};
use serde_json::{json, Value};

use super::dto::{CommandResponse, ResetRequest, UnlockConnectorRequest};
use crate::http::common::{ApiError, ApiResponse, ValidatedJson};
use crate::ocpp::actions::OcppAction;
use crate::ocpp::dispatcher::SharedOutboundDispatcher;
use crate::ocpp::registry::SharedConnectionRegistry;

type JsonResult<T> = Result<axum::Json<ApiResponse<T>>, ApiError>;

#[derive(Clone)]
pub struct OcppCommandsState {
    pub dispatcher: SharedOutboundDispatcher,
    pub registry: SharedConnectionRegistry,
}

fn to_response(result: Value) -> CommandResponse {
    let raw_status = result.get("status").and_then(Value::as_str).map(str::to_string);
    let accepted = raw_status.as_deref() == Some("Accepted");
    CommandResponse { accepted, raw_status }
}

pub async fn reset(State(state): State<OcppCommandsState>, Path(charger_id): Path<String>, ValidatedJson(body): ValidatedJson<ResetRequest>) -> JsonResult<CommandResponse> {
    let payload = json!({ "type": body.reset_type });
    let result = state.dispatcher.call(&charger_id, OcppAction::Reset, payload).await.map_err(ApiError::from)?;
    Ok(axum::Json(ApiResponse::success(to_response(result))))
}

pub async fn unlock_connector(State(state): State<OcppCommandsState>, Path(charger_id): Path<String>, axum::Json(body): axum::Json<UnlockConnectorRequest>) -> JsonResult<CommandResponse> {
    let payload = json!({ "connectorId": body.connector_id });
    let result = state.dispatcher.call(&charger_id, OcppAction::UnlockConnector, payload).await.map_err(ApiError::from)?;
    Ok(axum::Json(ApiResponse::success(to_response(result))))
}

pub async fn clear_cache(State(state): State<OcppCommandsState>, Path(charger_id): Path<String>) -> JsonResult<CommandResponse> {
    let result = state.dispatcher.call(&charger_id, OcppAction::ClearCache, json!({})).await.map_err(ApiError::from)?;
    Ok(axum::Json(ApiResponse::success(to_response(result))))
}
