//! Health check endpoint: service status, DB connectivity, uptime, and the
//! number of currently connected charge points.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::Json;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use serde::Serialize;

use crate::ocpp::registry::SharedConnectionRegistry;

#[derive(Clone)]
pub struct HealthState {
    pub db: DatabaseConnection,
    pub registry: SharedConnectionRegistry,
    pub started_at: Arc<Instant>,
}

#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: String,
    pub latency_ms: u128,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub database: ComponentHealth,
    pub connected_charge_points: usize,
}

pub async fn health_check(State(state): State<HealthState>) -> Json<HealthResponse> {
    let probe_started = Instant::now();
    let database = match state.db.execute(Statement::from_string(state.db.get_database_backend(), "SELECT 1".to_string())).await {
        Ok(_) => ComponentHealth { status: "ok".to_string(), latency_ms: probe_started.elapsed().as_millis() },
        Err(_) => ComponentHealth { status: "error".to_string(), latency_ms: probe_started.elapsed().as_millis() },
    };

    Json(HealthResponse {
        status: if database.status == "ok" { "ok".to_string() } else { "degraded".to_string() },
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        database,
        connected_charge_points: state.registry.count(),
    })
}
