//! Connection registry -- `active_chargers` in spec terms. One entry per
//! connected charge point, keyed by `charge_point_id`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug)]
pub struct Connection {
    pub charge_point_id: String,
    pub sender: mpsc::UnboundedSender<String>,
    pub connected_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Connection {
    pub fn new(charge_point_id: impl Into<String>, sender: mpsc::UnboundedSender<String>) -> Self {
        let now = Utc::now();
        Self { charge_point_id: charge_point_id.into(), sender, connected_at: now, last_activity: now }
    }

    pub fn send(&self, message: String) -> Result<(), String> {
        self.sender.send(message).map_err(|e| format!("failed to send: {e}"))
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}

pub struct ConnectionRegistry {
    connections: DashMap<String, Connection>,
}

pub type SharedConnectionRegistry = Arc<ConnectionRegistry>;

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self { connections: DashMap::new() }
    }

    pub fn shared() -> SharedConnectionRegistry {
        Arc::new(Self::new())
    }

    /// Registers a new connection. A second connection for the same id
    /// supersedes the first; the replaced `Connection` is returned so the
    /// caller can close it and fail its outstanding calls.
    pub fn register(&self, charge_point_id: &str, sender: mpsc::UnboundedSender<String>) -> Option<Connection> {
        let replaced = self.connections.remove(charge_point_id).map(|(_, old)| old);
        if replaced.is_some() {
            warn!(charge_point_id, "superseding existing connection");
        }
        info!(charge_point_id, "charger connected");
        self.connections.insert(charge_point_id.to_string(), Connection::new(charge_point_id, sender));
        replaced
    }

    pub fn unregister(&self, charge_point_id: &str) {
        if self.connections.remove(charge_point_id).is_some() {
            info!(charge_point_id, "charger disconnected");
        }
    }

    pub fn send_to(&self, charge_point_id: &str, message: String) -> Result<(), String> {
        match self.connections.get(charge_point_id) {
            Some(conn) => conn.send(message),
            None => Err(format!("charge point {charge_point_id} not connected")),
        }
    }

    pub fn touch(&self, charge_point_id: &str) {
        if let Some(mut conn) = self.connections.get_mut(charge_point_id) {
            conn.touch();
        }
    }

    pub fn is_connected(&self, charge_point_id: &str) -> bool {
        self.connections.contains_key(charge_point_id)
    }

    pub fn connected_ids(&self) -> Vec<String> {
        self.connections.iter().map(|r| r.key().clone()).collect()
    }

    pub fn count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
