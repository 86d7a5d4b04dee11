//! Wallet settlement: top-ups, payment-gateway credits, session debits, and
//! reward redemption. Every mutation runs under `Store::lock_wallet` and
//! appends a `wallet_transactions` row whose `balance_after` becomes the
//! next entry's `balance_before` (I-4).

use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use tracing::info;

use crate::clock::Clock;
use crate::domain::wallet::{find_reward, RewardCode};
use crate::error::{EngineError, EngineResult};
use crate::infrastructure::database::entities::{payment_transaction, wallet, wallet_transaction};
use crate::infrastructure::database::store::Store;

pub struct WalletEngine {
    store: Store,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopupStatus {
    Credited,
    AlreadyProcessed,
}

impl WalletEngine {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// RM 1.00 .. RM 500.00 per transaction, per the wallet top-up contract.
    pub fn validate_topup(&self, amount: Decimal) -> EngineResult<()> {
        if amount < Decimal::new(100, 2) || amount > Decimal::new(50000, 2) {
            return Err(EngineError::Validation("top-up amount must be between RM 1.00 and RM 500.00".into()));
        }
        Ok(())
    }

    async fn wallet_for_user(&self, user_id: i64) -> EngineResult<wallet::Model> {
        wallet::Entity::find()
            .filter(wallet::Column::UserId.eq(user_id))
            .one(&self.store.db)
            .await?
            .ok_or_else(|| EngineError::not_found("wallet", user_id.to_string()))
    }

    /// Idempotent cash top-up keyed on `reference`. If a ledger entry with
    /// this reference already exists, returns `AlreadyProcessed` without
    /// touching the balance again.
    pub async fn topup(&self, user_id: i64, amount: Decimal, reference: &str, description: &str) -> EngineResult<TopupStatus> {
        self.validate_topup(amount)?;
        let _guard = self.store.lock_wallet(user_id).await;

        if wallet_transaction::Entity::find()
            .filter(wallet_transaction::Column::Reference.eq(reference))
            .one(&self.store.db)
            .await?
            .is_some()
        {
            return Ok(TopupStatus::AlreadyProcessed);
        }

        let wallet = self.wallet_for_user(user_id).await?;
        self.apply_cash_delta(wallet, amount, Some(reference), description, "topup").await?;
        Ok(TopupStatus::Credited)
    }

    /// Credits a wallet from a settled payment-gateway transaction. Safe
    /// against duplicate gateway callbacks: the `transaction_ref` doubles
    /// as the ledger reference, so a replayed callback is a no-op (I-5).
    pub async fn credit_from_payment(&self, payment: &payment_transaction::Model) -> EngineResult<TopupStatus> {
        let _guard = self.store.lock_wallet(payment.user_id).await;

        if wallet_transaction::Entity::find()
            .filter(wallet_transaction::Column::Reference.eq(&payment.transaction_ref))
            .one(&self.store.db)
            .await?
            .is_some()
        {
            return Ok(TopupStatus::AlreadyProcessed);
        }

        let wallet = self.wallet_for_user(payment.user_id).await?;
        let points_earned = points_earned_for(payment.amount);
        self.apply_payment_credit(wallet, payment.amount, points_earned, &payment.transaction_ref, &format!("payment settlement via {}", payment.gateway)).await?;
        Ok(TopupStatus::Credited)
    }

    /// Like `apply_cash_delta` but also accrues reward points, as only
    /// gateway-settled top-ups earn them (a plain `topup` does not).
    async fn apply_payment_credit(&self, wallet: wallet::Model, amount: Decimal, points_earned: i64, reference: &str, description: &str) -> EngineResult<()> {
        let now = self.clock.now();
        let wallet_id = wallet.id;
        let user_id = wallet.user_id;
        let cash_before = wallet.cash_balance;
        let cash_after = cash_before + amount;
        let points_before = wallet.points_balance;
        let points_after = points_before + points_earned;

        let mut am: wallet::ActiveModel = wallet.into();
        am.cash_balance = Set(cash_after);
        am.points_balance = Set(points_after);
        am.updated_at = Set(now);
        am.update(&self.store.db).await?;

        let ledger = wallet_transaction::ActiveModel {
            wallet_id: Set(wallet_id),
            kind: Set("payment_credit".to_string()),
            cash_delta: Set(amount),
            points_delta: Set(points_earned),
            cash_balance_before: Set(cash_before),
            cash_balance_after: Set(cash_after),
            points_balance_before: Set(points_before),
            points_balance_after: Set(points_after),
            reference: Set(Some(reference.to_string())),
            description: Set(description.to_string()),
            created_at: Set(now),
            ..Default::default()
        };
        ledger.insert(&self.store.db).await?;
        self.store
            .write_audit(Some(user_id), "wallet.payment_credit", None, Some(serde_json::json!({"reference": reference, "amount": amount.to_string()})), now)
            .await?;
        Ok(())
    }

    pub async fn debit_for_session(&self, user_id: i64, amount: Decimal, session_description: &str) -> EngineResult<()> {
        if amount <= Decimal::ZERO {
            return Err(EngineError::Validation("debit amount must be positive".into()));
        }
        let _guard = self.store.lock_wallet(user_id).await;
        let wallet = self.wallet_for_user(user_id).await?;
        if wallet.cash_balance < amount {
            return Err(EngineError::Conflict("insufficient wallet balance".into()));
        }
        self.apply_cash_delta(wallet, -amount, None, session_description, "session_debit").await?;
        Ok(())
    }

    pub async fn redeem_reward(&self, user_id: i64, code: RewardCode, claimed_points_cost: i64) -> EngineResult<()> {
        let item = find_reward(code).ok_or_else(|| EngineError::Validation("unknown reward code".into()))?;
        if claimed_points_cost != item.points_cost {
            return Err(EngineError::Validation("reward cost does not match catalog".into()));
        }

        let _guard = self.store.lock_wallet(user_id).await;
        let wallet = self.wallet_for_user(user_id).await?;
        if wallet.points_balance < item.points_cost {
            return Err(EngineError::Conflict("insufficient points balance".into()));
        }

        let now = self.clock.now();
        let wallet_id = wallet.id;
        let points_before = wallet.points_balance;
        let points_after = points_before - item.points_cost;
        let cash_before = wallet.cash_balance;
        let cash_after = cash_before + item.cash_value;

        let mut am: wallet::ActiveModel = wallet.into();
        am.points_balance = Set(points_after);
        am.cash_balance = Set(cash_after);
        am.updated_at = Set(now);
        am.update(&self.store.db).await?;

        let ledger = wallet_transaction::ActiveModel {
            wallet_id: Set(wallet_id),
            kind: Set("reward_redemption".to_string()),
            cash_delta: Set(item.cash_value),
            points_delta: Set(-item.points_cost),
            cash_balance_before: Set(cash_before),
            cash_balance_after: Set(cash_after),
            points_balance_before: Set(points_before),
            points_balance_after: Set(points_after),
            reference: Set(None),
            description: Set(format!("redeemed {:?}", item.code)),
            created_at: Set(now),
            ..Default::default()
        };
        ledger.insert(&self.store.db).await?;
        self.store.write_audit(Some(user_id), "wallet.reward_redemption", None, Some(serde_json::json!({"code": format!("{:?}", code)})), now).await?;
        info!(user_id, ?code, "reward redeemed");
        Ok(())
    }

    /// Applies a cash-only delta (top-ups and session debits carry no
    /// points component) and writes the paired ledger row.
    async fn apply_cash_delta(&self, wallet: wallet::Model, delta: Decimal, reference: Option<&str>, description: &str, kind: &str) -> EngineResult<()> {
        let now = self.clock.now();
        let wallet_id = wallet.id;
        let user_id = wallet.user_id;
        let cash_before = wallet.cash_balance;
        let cash_after = cash_before + delta;
        let points_before = wallet.points_balance;

        let mut am: wallet::ActiveModel = wallet.into();
        am.cash_balance = Set(cash_after);
        am.updated_at = Set(now);
        am.update(&self.store.db).await?;

        let ledger = wallet_transaction::ActiveModel {
            wallet_id: Set(wallet_id),
            kind: Set(kind.to_string()),
            cash_delta: Set(delta),
            points_delta: Set(0),
            cash_balance_before: Set(cash_before),
            cash_balance_after: Set(cash_after),
            points_balance_before: Set(points_before),
            points_balance_after: Set(points_before),
            reference: Set(reference.map(str::to_string)),
            description: Set(description.to_string()),
            created_at: Set(now),
            ..Default::default()
        };
        ledger.insert(&self.store.db).await?;
        self.store.write_audit(Some(user_id), &format!("wallet.{kind}"), None, Some(serde_json::json!({"delta": delta.to_string()})), now).await?;
        Ok(())
    }
}

/// `floor(amount) * 10 + (50 bonus if amount >= RM 50)`.
fn points_earned_for(amount: Decimal) -> i64 {
    let whole = amount.trunc().to_i64().unwrap_or(0);
    let bonus = if amount >= Decimal::new(5000, 2) { 50 } else { 0 };
    whole * 10 + bonus
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_earned_applies_bonus_at_threshold() {
        assert_eq!(points_earned_for(Decimal::new(5000, 2)), 550);
        assert_eq!(points_earned_for(Decimal::new(4999, 2)), 490);
        assert_eq!(points_earned_for(Decimal::new(1000, 2)), 100);
    }
}
