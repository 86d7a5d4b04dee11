//! Unified application state. One `AppState` is built once at startup;
//! axum's `FromRef` projects it down into the narrower state each module
//! actually needs, so a handler's `State<T>` extractor only sees what it
//! depends on.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::FromRef;

use crate::auth::{AuthState, JwtConfig};
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::engines::session_engine::SessionEngine;
use crate::engines::ticket_engine::TicketEngine;
use crate::engines::wallet_engine::WalletEngine;
use crate::infrastructure::database::store::Store;
use crate::ocpp::dispatcher::SharedOutboundDispatcher;
use crate::ocpp::registry::SharedConnectionRegistry;
use crate::payment::GatewayRegistry;

use super::modules::{auth, charging, health, ocpp_commands, payment, tickets};

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub session_engine: Arc<SessionEngine>,
    pub wallet_engine: Arc<WalletEngine>,
    pub ticket_engine: Arc<TicketEngine>,
    pub dispatcher: SharedOutboundDispatcher,
    pub registry: SharedConnectionRegistry,
    pub jwt_config: JwtConfig,
    pub gateways: Arc<GatewayRegistry>,
    pub config: Arc<AppConfig>,
    pub clock: Arc<dyn Clock>,
    pub started_at: Arc<Instant>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(s: &AppState) -> Self {
        AuthState { jwt_config: s.jwt_config.clone() }
    }
}

impl FromRef<AppState> for auth::AuthModuleState {
    fn from_ref(s: &AppState) -> Self {
        auth::AuthModuleState { store: s.store.clone(), jwt_config: s.jwt_config.clone(), clock: Arc::clone(&s.clock) }
    }
}

impl FromRef<AppState> for charging::ChargersState {
    fn from_ref(s: &AppState) -> Self {
        charging::ChargersState { db: s.store.db.clone(), session_engine: Arc::clone(&s.session_engine), registry: Arc::clone(&s.registry) }
    }
}

impl FromRef<AppState> for ocpp_commands::OcppCommandsState {
    fn from_ref(s: &AppState) -> Self {
        ocpp_commands::OcppCommandsState { dispatcher: Arc::clone(&s.dispatcher), registry: Arc::clone(&s.registry) }
    }
}

impl FromRef<AppState> for payment::PaymentState {
    fn from_ref(s: &AppState) -> Self {
        payment::PaymentState {
            store: s.store.clone(),
            wallet_engine: Arc::clone(&s.wallet_engine),
            gateways: Arc::clone(&s.gateways),
            config: Arc::clone(&s.config),
            clock: Arc::clone(&s.clock),
        }
    }
}

impl FromRef<AppState> for tickets::TicketsState {
    fn from_ref(s: &AppState) -> Self {
        tickets::TicketsState { db: s.store.db.clone(), ticket_engine: Arc::clone(&s.ticket_engine) }
    }
}

impl FromRef<AppState> for health::HealthState {
    fn from_ref(s: &AppState) -> Self {
        health::HealthState { db: s.store.db.clone(), registry: Arc::clone(&s.registry), started_at: Arc::clone(&s.started_at) }
    }
}
