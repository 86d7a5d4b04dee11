//! Outbound call dispatcher -- `pending_calls` in spec terms. Generalizes
//! the one-struct-per-action command sender into a single `call()` keyed
//! by `(charge_point_id, unique_id)`, with per-action timeout selection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::error::EngineError;
use crate::ocpp::actions::OcppAction;
use crate::ocpp::frame::OcppFrame;
use crate::ocpp::registry::SharedConnectionRegistry;

struct PendingCall {
    action: OcppAction,
    sender: oneshot::Sender<Result<Value, EngineError>>,
}

pub struct OutboundDispatcher {
    registry: SharedConnectionRegistry,
    pending: DashMap<(String, String), PendingCall>,
    counter: AtomicU64,
    call_timeout_secs: u64,
    long_call_timeout_secs: u64,
}

pub type SharedOutboundDispatcher = Arc<OutboundDispatcher>;

impl OutboundDispatcher {
    pub fn new(registry: SharedConnectionRegistry, call_timeout_secs: u64, long_call_timeout_secs: u64) -> Self {
        Self {
            registry,
            pending: DashMap::new(),
            counter: AtomicU64::new(1),
            call_timeout_secs,
            long_call_timeout_secs,
        }
    }

    pub fn shared(registry: SharedConnectionRegistry, call_timeout_secs: u64, long_call_timeout_secs: u64) -> SharedOutboundDispatcher {
        Arc::new(Self::new(registry, call_timeout_secs, long_call_timeout_secs))
    }

    fn next_unique_id(&self) -> String {
        format!("CS-{}", self.counter.fetch_add(1, Ordering::SeqCst))
    }

    /// Sends `action` with `payload` to `charge_point_id` and waits for the
    /// matching CALLRESULT/CALLERROR, or times out.
    pub async fn call(&self, charge_point_id: &str, action: OcppAction, payload: Value) -> Result<Value, EngineError> {
        if !self.registry.is_connected(charge_point_id) {
            return Err(EngineError::Transport(format!("{charge_point_id} is not connected")));
        }

        let unique_id = self.next_unique_id();
        let frame = OcppFrame::Call { unique_id: unique_id.clone(), action: action.as_str().to_string(), payload };
        let json = frame.serialize();

        let (tx, rx) = oneshot::channel();
        let key = (charge_point_id.to_string(), unique_id.clone());
        self.pending.insert(key.clone(), PendingCall { action, sender: tx });

        info!(charge_point_id, action = action.as_str(), unique_id = unique_id.as_str(), "sending command");

        if let Err(e) = self.registry.send_to(charge_point_id, json) {
            self.pending.remove(&key);
            return Err(EngineError::Transport(e));
        }

        let secs = if action.uses_long_timeout() { self.long_call_timeout_secs } else { self.call_timeout_secs };

        match timeout(Duration::from_secs(secs), rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => {
                self.pending.remove(&key);
                Err(EngineError::Transport("response channel closed".into()))
            }
            Err(_) => {
                self.pending.remove(&key);
                warn!(charge_point_id, action = action.as_str(), unique_id = unique_id.as_str(), "command timed out");
                Err(EngineError::TransportTimeout)
            }
        }
    }

    pub fn resolve(&self, charge_point_id: &str, unique_id: &str, payload: Value) {
        let key = (charge_point_id.to_string(), unique_id.to_string());
        if let Some((_, pending)) = self.pending.remove(&key) {
            info!(charge_point_id, action = pending.action.as_str(), unique_id, "received response");
            let _ = pending.sender.send(Ok(payload));
        } else {
            warn!(charge_point_id, unique_id, "response for unknown or expired call");
        }
    }

    pub fn reject(&self, charge_point_id: &str, unique_id: &str, error_code: &str, error_description: &str) {
        let key = (charge_point_id.to_string(), unique_id.to_string());
        if let Some((_, pending)) = self.pending.remove(&key) {
            warn!(charge_point_id, action = pending.action.as_str(), unique_id, error_code, "received CALLERROR");
            let _ = pending.sender.send(Err(EngineError::Gateway(format!("{error_code}: {error_description}"))));
        }
    }

    /// Fails every call outstanding for a charge point, e.g. when its
    /// connection is superseded or drops.
    pub fn fail_all_for(&self, charge_point_id: &str, reason: &str) {
        let keys: Vec<_> = self
            .pending
            .iter()
            .filter(|entry| entry.key().0 == charge_point_id)
            .map(|entry| entry.key().clone())
            .collect();
        for key in keys {
            if let Some((_, pending)) = self.pending.remove(&key) {
                let _ = pending.sender.send(Err(EngineError::Transport(reason.to_string())));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocpp::registry::ConnectionRegistry;

    #[tokio::test]
    async fn call_to_unconnected_charger_fails_fast_without_registering_pending() {
        let registry = ConnectionRegistry::shared();
        let dispatcher = OutboundDispatcher::new(registry, 30, 60);
        let result = dispatcher.call("ghost", OcppAction::ClearCache, serde_json::json!({})).await;
        assert!(matches!(result, Err(EngineError::Transport(_))));
        assert_eq!(dispatcher.pending.len(), 0);
    }
}
