//! Charging session handlers: remote start/stop and charger listing.
//!
//! Neither `/start` nor `/stop` carries a `user_id` field in its body (the
//! id_tag is the charge card, not necessarily the caller), so there is no
//! resource-owner check here -- any authenticated user may operate a
//! charger, per spec.md's auth column for these two rows ("user", not
//! "owner").

use std::sync::Arc;

use axum::extract::State;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use super::dto::{ChargerSummary, StartChargingRequest, StartChargingResponse, StopChargingRequest, StopChargingResponse};
use crate::engines::session_engine::SessionEngine;
use crate::error::EngineError;
use crate::http::common::{ApiError, ApiResponse, ValidatedJson};
use crate::infrastructure::database::entities::{charger, charging_session};
use crate::ocpp::registry::SharedConnectionRegistry;

type JsonResult<T> = Result<axum::Json<ApiResponse<T>>, ApiError>;

#[derive(Clone)]
pub struct ChargersState {
    pub db: DatabaseConnection,
    pub session_engine: Arc<SessionEngine>,
    pub registry: SharedConnectionRegistry,
}

pub async fn start_charging(State(state): State<ChargersState>, ValidatedJson(body): ValidatedJson<StartChargingRequest>) -> JsonResult<StartChargingResponse> {
    let session = state.session_engine.remote_start(&body.charger_id, body.connector_id, &body.id_tag).await.map_err(ApiError::from)?;
    Ok(axum::Json(ApiResponse::success(StartChargingResponse { session_id: session.id, status: session.status })))
}

pub async fn stop_charging(State(state): State<ChargersState>, ValidatedJson(body): ValidatedJson<StopChargingRequest>) -> JsonResult<StopChargingResponse> {
    let charger_id = match body.charger_id {
        Some(id) => id,
        None => {
            let transaction_id = body.transaction_id.ok_or_else(|| EngineError::Validation("charger_id or transaction_id is required".into()))?;
            charging_session::Entity::find()
                .filter(charging_session::Column::TransactionId.eq(transaction_id))
                .one(&state.db)
                .await
                .map_err(EngineError::from)?
                .ok_or_else(|| EngineError::not_found("charging_session", transaction_id.to_string()))?
                .charge_point_id
        }
    };

    let outcome = state.session_engine.remote_stop(&charger_id, body.transaction_id).await.map_err(ApiError::from)?;
    Ok(axum::Json(ApiResponse::success(StopChargingResponse { accepted: outcome.accepted, best_effort: outcome.best_effort })))
}

pub async fn list_chargers(State(state): State<ChargersState>) -> JsonResult<Vec<ChargerSummary>> {
    let chargers = charger::Entity::find().all(&state.db).await.map_err(EngineError::from)?;
    let items = chargers
        .into_iter()
        .map(|c| ChargerSummary { connected: state.registry.is_connected(&c.charge_point_id), charge_point_id: c.charge_point_id, vendor: c.vendor, model: c.model, availability: c.availability })
        .collect();
    Ok(axum::Json(ApiResponse::success(items)))
}
