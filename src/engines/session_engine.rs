//! Charging session lifecycle: placeholder creation on remote start,
//! reconciliation against BootNotification/StatusNotification, and the
//! StartTransaction/StopTransaction/MeterValues wire handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::clock::Clock;
use crate::config::AppConfig;
use crate::domain::charger::{ChargerAvailability, FaultType};
use crate::domain::session::{is_placeholder, PLACEHOLDER_TRANSACTION_ID};
use crate::error::{EngineError, EngineResult};
use crate::infrastructure::database::entities::{charger, charging_session, fault, meter_value};
use crate::infrastructure::database::store::Store;
use crate::ocpp::actions::OcppAction;
use crate::ocpp::dispatcher::SharedOutboundDispatcher;

pub struct SessionEngine {
    store: Store,
    clock: Arc<dyn Clock>,
    dispatcher: SharedOutboundDispatcher,
    status_notification_grace_secs: i64,
    reconnect_trust_window_secs: i64,
    heartbeat_interval_secs: i64,
}

pub struct RemoteStopOutcome {
    pub accepted: bool,
    /// `true` when the caller asked to stop a charger's only active session
    /// without knowing its OCPP transaction id, so the gateway guessed
    /// `transactionId = 0`. Some chargers honor this, some don't -- callers
    /// should not treat `accepted` as a guarantee the session actually
    /// stopped in that case.
    pub best_effort: bool,
}

impl SessionEngine {
    pub fn new(store: Store, clock: Arc<dyn Clock>, dispatcher: SharedOutboundDispatcher, config: &AppConfig) -> Self {
        Self {
            store,
            clock,
            dispatcher,
            status_notification_grace_secs: config.status_notification_grace_secs,
            reconnect_trust_window_secs: config.reconnect_trust_window_secs,
            heartbeat_interval_secs: config.heartbeat_interval_secs,
        }
    }

    /// Pre-allocates a placeholder session (I-1: `transaction_id <= 0`) and
    /// marks the connector `charging` *before* the outbound call, per the
    /// round-trip law: a RemoteStart that times out must still leave a
    /// placeholder behind so a reconnect within the trust window converges
    /// to one active session once StartTransaction arrives. Only an
    /// explicit charger rejection undoes the placeholder.
    pub async fn remote_start(&self, charge_point_id: &str, connector_id: i32, id_tag: &str) -> EngineResult<charging_session::Model> {
        let now = self.clock.now();
        let active = charging_session::Entity::find()
            .filter(charging_session::Column::ChargePointId.eq(charge_point_id))
            .filter(charging_session::Column::ConnectorId.eq(connector_id))
            .filter(charging_session::Column::Status.is_in(["pending", "active"]))
            .one(&self.store.db)
            .await?;
        if active.is_some() {
            return Err(EngineError::Conflict(format!("connector {connector_id} on {charge_point_id} already has a session")));
        }

        let model = charging_session::ActiveModel {
            charge_point_id: Set(charge_point_id.to_string()),
            connector_id: Set(connector_id),
            transaction_id: Set(PLACEHOLDER_TRANSACTION_ID),
            id_tag: Set(id_tag.to_string()),
            status: Set("pending".to_string()),
            meter_start_wh: Set(0),
            meter_stop_wh: Set(None),
            energy_kwh: Set(Decimal::ZERO),
            started_at: Set(now),
            stopped_at: Set(None),
            stop_reason: Set(None),
            last_seen_at: Set(now),
            ..Default::default()
        };
        let session = model.insert(&self.store.db).await?;
        self.set_charger_availability(charge_point_id, ChargerAvailability::Charging, now).await?;

        let payload = json!({ "connectorId": connector_id, "idTag": id_tag });
        match self.dispatcher.call(charge_point_id, OcppAction::RemoteStartTransaction, payload).await {
            Ok(response) => {
                let accepted = response.get("status").and_then(Value::as_str) == Some("Accepted");
                if accepted {
                    Ok(session)
                } else {
                    warn!(charge_point_id, connector_id, "charger rejected RemoteStartTransaction, reverting placeholder");
                    self.revert_remote_start(session, charge_point_id).await?;
                    Err(EngineError::Gateway("charger rejected RemoteStartTransaction".into()))
                }
            }
            Err(EngineError::TransportTimeout) => {
                warn!(charge_point_id, connector_id, "RemoteStartTransaction timed out, keeping placeholder as best-effort");
                self.set_charger_availability(charge_point_id, ChargerAvailability::Preparing, self.clock.now()).await?;
                Ok(session)
            }
            Err(e) => {
                self.revert_remote_start(session, charge_point_id).await?;
                Err(e)
            }
        }
    }

    async fn revert_remote_start(&self, session: charging_session::Model, charge_point_id: &str) -> EngineResult<()> {
        let id = session.id;
        charging_session::Entity::delete_by_id(id).exec(&self.store.db).await?;
        self.set_charger_availability(charge_point_id, ChargerAvailability::Available, self.clock.now()).await?;
        Ok(())
    }

    pub async fn remote_stop(&self, charge_point_id: &str, transaction_id: Option<i64>) -> EngineResult<RemoteStopOutcome> {
        let (tx_id, best_effort) = match transaction_id {
            Some(id) => (id, false),
            None => {
                let active = charging_session::Entity::find()
                    .filter(charging_session::Column::ChargePointId.eq(charge_point_id))
                    .filter(charging_session::Column::Status.eq("active"))
                    .one(&self.store.db)
                    .await?;
                match active {
                    Some(s) => (s.transaction_id, false),
                    None => (0, true),
                }
            }
        };
        let payload = json!({ "transactionId": tx_id });
        let response = self.dispatcher.call(charge_point_id, OcppAction::RemoteStopTransaction, payload).await?;
        let accepted = response.get("status").and_then(Value::as_str) == Some("Accepted");
        Ok(RemoteStopOutcome { accepted, best_effort })
    }

    /// Upserts the charger row and, per the reconnect-trust-window rule,
    /// leaves any placeholder session created in the last
    /// `reconnect_trust_window_secs` alone -- the charger may simply be
    /// reconnecting mid-session, not starting fresh.
    pub async fn on_boot_notification(&self, charge_point_id: &str, vendor: &str, model: &str, serial_number: Option<String>, firmware_version: Option<String>) -> EngineResult<i64> {
        let now = self.clock.now();
        let existing = charger::Entity::find_by_id(charge_point_id).one(&self.store.db).await?;
        match existing {
            Some(existing) => {
                let mut am: charger::ActiveModel = existing.into();
                am.vendor = Set(vendor.to_string());
                am.model = Set(model.to_string());
                am.serial_number = Set(serial_number);
                am.firmware_version = Set(firmware_version);
                am.updated_at = Set(now);
                am.update(&self.store.db).await?;
            }
            None => {
                let am = charger::ActiveModel {
                    charge_point_id: Set(charge_point_id.to_string()),
                    vendor: Set(vendor.to_string()),
                    model: Set(model.to_string()),
                    serial_number: Set(serial_number),
                    firmware_version: Set(firmware_version),
                    availability: Set(serde_json::to_value(ChargerAvailability::Unavailable).unwrap().as_str().unwrap().to_string()),
                    heartbeat_interval_secs: Set(self.heartbeat_interval_secs),
                    last_heartbeat_at: Set(None),
                    registered_at: Set(now),
                    updated_at: Set(now),
                };
                am.insert(&self.store.db).await?;
            }
        }
        self.reconcile_reconnect(charge_point_id, now).await?;
        Ok(self.heartbeat_interval_secs)
    }

    async fn reconcile_reconnect(&self, charge_point_id: &str, now: DateTime<Utc>) -> EngineResult<()> {
        let candidate = charging_session::Entity::find()
            .filter(charging_session::Column::ChargePointId.eq(charge_point_id))
            .filter(charging_session::Column::Status.is_in(["pending", "active"]))
            .order_by_desc(charging_session::Column::StartedAt)
            .one(&self.store.db)
            .await?;

        let trusted = match &candidate {
            Some(session) if session.status == "active" => true,
            Some(session) => (now - session.last_seen_at).num_seconds() <= self.reconnect_trust_window_secs,
            None => false,
        };

        if trusted {
            info!(charge_point_id, "trusting in-flight session across reconnect, restoring availability to charging");
            self.set_charger_availability(charge_point_id, ChargerAvailability::Charging, now).await?;
        } else if let Some(session) = &candidate {
            let age = (now - session.last_seen_at).num_seconds();
            warn!(charge_point_id, age_secs = age, "pending session older than reconnect trust window, leaving for status-notification sweep");
        }
        Ok(())
    }

    pub async fn on_heartbeat(&self, charge_point_id: &str) -> EngineResult<DateTime<Utc>> {
        let now = self.clock.now();
        if let Some(existing) = charger::Entity::find_by_id(charge_point_id).one(&self.store.db).await? {
            let mut am: charger::ActiveModel = existing.into();
            am.last_heartbeat_at = Set(Some(now));
            am.updated_at = Set(now);
            am.update(&self.store.db).await?;
        }
        Ok(now)
    }

    /// Folds the wire status into `ChargerAvailability`, persists a fault
    /// row if `Faulted`, and terminalizes a stale placeholder session once
    /// the connector has been idle for longer than
    /// `status_notification_grace_secs` (120s by default).
    pub async fn on_status_notification(&self, charge_point_id: &str, connector_id: i32, status: &str, error_code: &str, info_text: Option<String>) -> EngineResult<()> {
        let now = self.clock.now();
        let availability = ChargerAvailability::from_ocpp_status(status);

        if let Some(existing) = charger::Entity::find_by_id(charge_point_id).one(&self.store.db).await? {
            let mut am: charger::ActiveModel = existing.into();
            am.availability = Set(serde_json::to_value(availability).unwrap().as_str().unwrap().to_string());
            am.updated_at = Set(now);
            am.update(&self.store.db).await?;
        }

        if error_code != "NoError" {
            let fault_type = FaultType::from_ocpp_error_code(error_code);
            let fault_type_str = serde_json::to_value(fault_type).unwrap().as_str().unwrap().to_string();
            let already_raised = fault::Entity::find()
                .filter(fault::Column::ChargePointId.eq(charge_point_id))
                .filter(fault::Column::FaultType.eq(&fault_type_str))
                .filter(fault::Column::ClearedAt.is_null())
                .one(&self.store.db)
                .await?
                .is_some();
            if !already_raised {
                let am = fault::ActiveModel {
                    charge_point_id: Set(charge_point_id.to_string()),
                    connector_id: Set(connector_id),
                    fault_type: Set(fault_type_str),
                    info: Set(info_text),
                    raised_at: Set(now),
                    cleared_at: Set(None),
                    ..Default::default()
                };
                am.insert(&self.store.db).await?;
            }
        } else if availability != ChargerAvailability::Faulted {
            let uncleared = fault::Entity::find()
                .filter(fault::Column::ChargePointId.eq(charge_point_id))
                .filter(fault::Column::ClearedAt.is_null())
                .all(&self.store.db)
                .await?;
            for f in uncleared {
                let mut am: fault::ActiveModel = f.into();
                am.cleared_at = Set(Some(now));
                am.update(&self.store.db).await?;
            }
        }

        if availability.is_idle() {
            self.terminalize_if_stale(charge_point_id, connector_id, now).await?;
        }

        Ok(())
    }

    /// A placeholder session (`transaction_id <= 0`) that never got a real
    /// StartTransaction is cleared as soon as the connector goes idle,
    /// independent of age -- it never occupied the connector for real, and
    /// leaving it dangling would block a fresh RemoteStart (I-1). A real
    /// session only terminalizes after `status_notification_grace_secs` of
    /// inactivity.
    async fn terminalize_if_stale(&self, charge_point_id: &str, connector_id: i32, now: DateTime<Utc>) -> EngineResult<()> {
        let candidate = charging_session::Entity::find()
            .filter(charging_session::Column::ChargePointId.eq(charge_point_id))
            .filter(charging_session::Column::ConnectorId.eq(connector_id))
            .filter(charging_session::Column::Status.is_in(["pending", "active"]))
            .one(&self.store.db)
            .await?;
        let Some(session) = candidate else { return Ok(()) };

        if is_placeholder(session.transaction_id) {
            warn!(charge_point_id, connector_id, "clearing dangling placeholder session on idle connector");
            self.complete_session(session, now, "idle_timeout").await?;
            return Ok(());
        }

        let idle_secs = (now - session.last_seen_at).num_seconds();
        if idle_secs < self.status_notification_grace_secs {
            return Ok(());
        }
        warn!(charge_point_id, connector_id, idle_secs, "terminalizing stale session after idle grace window");
        self.complete_session(session, now, "idle_timeout").await?;
        Ok(())
    }

    async fn complete_session(&self, session: charging_session::Model, now: DateTime<Utc>, stop_reason: &str) -> EngineResult<()> {
        let mut am: charging_session::ActiveModel = session.into();
        am.status = Set("completed".to_string());
        am.stopped_at = Set(Some(now));
        am.stop_reason = Set(Some(stop_reason.to_string()));
        am.update(&self.store.db).await?;
        Ok(())
    }

    /// Reconciles a real StartTransaction against a pending placeholder (or
    /// creates a fresh row if none is within the reconnect trust window).
    pub async fn on_start_transaction(&self, charge_point_id: &str, connector_id: i32, id_tag: &str, meter_start_wh: i64, transaction_id: i64, timestamp: DateTime<Utc>) -> EngineResult<charging_session::Model> {
        let now = self.clock.now();
        let pending = charging_session::Entity::find()
            .filter(charging_session::Column::ChargePointId.eq(charge_point_id))
            .filter(charging_session::Column::ConnectorId.eq(connector_id))
            .filter(charging_session::Column::Status.eq("pending"))
            .order_by_desc(charging_session::Column::StartedAt)
            .one(&self.store.db)
            .await?;

        let session = match pending {
            Some(session) if is_placeholder(session.transaction_id) => {
                let mut am: charging_session::ActiveModel = session.into();
                am.transaction_id = Set(transaction_id);
                am.id_tag = Set(id_tag.to_string());
                am.meter_start_wh = Set(meter_start_wh);
                am.status = Set("active".to_string());
                am.last_seen_at = Set(now);
                am.update(&self.store.db).await?
            }
            _ => {
                let am = charging_session::ActiveModel {
                    charge_point_id: Set(charge_point_id.to_string()),
                    connector_id: Set(connector_id),
                    transaction_id: Set(transaction_id),
                    id_tag: Set(id_tag.to_string()),
                    status: Set("active".to_string()),
                    meter_start_wh: Set(meter_start_wh),
                    meter_stop_wh: Set(None),
                    energy_kwh: Set(Decimal::ZERO),
                    started_at: Set(timestamp),
                    stopped_at: Set(None),
                    stop_reason: Set(None),
                    last_seen_at: Set(now),
                    ..Default::default()
                };
                am.insert(&self.store.db).await?
            }
        };

        self.set_charger_availability(charge_point_id, ChargerAvailability::Charging, now).await?;
        Ok(session)
    }

    pub async fn on_stop_transaction(&self, transaction_id: i64, meter_stop_wh: i64, reason: Option<String>, timestamp: DateTime<Utc>) -> EngineResult<charging_session::Model> {
        let session = charging_session::Entity::find()
            .filter(charging_session::Column::TransactionId.eq(transaction_id))
            .filter(charging_session::Column::Status.eq("active"))
            .one(&self.store.db)
            .await?
            .ok_or_else(|| EngineError::not_found("charging_session", transaction_id.to_string()))?;

        let charge_point_id = session.charge_point_id.clone();
        let meter_start_wh = session.meter_start_wh;
        let mut am: charging_session::ActiveModel = session.into();
        am.meter_stop_wh = Set(Some(meter_stop_wh));
        am.energy_kwh = Set(wh_to_kwh((meter_stop_wh - meter_start_wh).max(0)));
        am.status = Set("completed".to_string());
        am.stopped_at = Set(Some(timestamp));
        am.stop_reason = Set(reason);
        am.last_seen_at = Set(self.clock.now());
        let updated = am.update(&self.store.db).await?;

        self.set_charger_availability(&charge_point_id, ChargerAvailability::Available, self.clock.now()).await?;
        Ok(updated)
    }

    async fn set_charger_availability(&self, charge_point_id: &str, availability: ChargerAvailability, now: DateTime<Utc>) -> EngineResult<()> {
        if let Some(existing) = charger::Entity::find_by_id(charge_point_id).one(&self.store.db).await? {
            let mut am: charger::ActiveModel = existing.into();
            am.availability = Set(serde_json::to_value(availability).unwrap().as_str().unwrap().to_string());
            am.updated_at = Set(now);
            am.update(&self.store.db).await?;
        }
        Ok(())
    }

    pub async fn on_meter_values(&self, charge_point_id: &str, connector_id: i32, transaction_id: Option<i64>, readings_wh: &[i64], recorded_at: DateTime<Utc>) -> EngineResult<()> {
        let session = match transaction_id {
            Some(tx_id) => charging_session::Entity::find().filter(charging_session::Column::TransactionId.eq(tx_id)).one(&self.store.db).await?,
            None => {
                charging_session::Entity::find()
                    .filter(charging_session::Column::ChargePointId.eq(charge_point_id))
                    .filter(charging_session::Column::ConnectorId.eq(connector_id))
                    .filter(charging_session::Column::Status.eq("active"))
                    .one(&self.store.db)
                    .await?
            }
        };
        let Some(session) = session else {
            warn!(charge_point_id, connector_id, "MeterValues for a connector with no active session, dropping");
            return Ok(());
        };

        for reading in readings_wh {
            let am = meter_value::ActiveModel {
                session_id: Set(session.id),
                reading_wh: Set(*reading),
                recorded_at: Set(recorded_at),
                ..Default::default()
            };
            am.insert(&self.store.db).await?;
        }

        let meter_start_wh = session.meter_start_wh;
        let latest_cumulative_wh = readings_wh.iter().copied().max();
        let mut am: charging_session::ActiveModel = session.into();
        if let Some(latest) = latest_cumulative_wh {
            am.energy_kwh = Set(wh_to_kwh((latest - meter_start_wh).max(0)));
        }
        am.last_seen_at = Set(self.clock.now());
        am.update(&self.store.db).await?;
        Ok(())
    }
}

fn wh_to_kwh(wh: i64) -> Decimal {
    Decimal::new(wh, 0) / Decimal::new(1000, 0)
}
