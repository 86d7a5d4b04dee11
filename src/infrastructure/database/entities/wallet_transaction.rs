//! Wallet ledger entry. `balance_after` of entry N must equal
//! `balance_before` of entry N+1 for the same wallet (I-4) -- enforced by
//! the wallet engine, not by the schema, since sea-orm can't express a
//! cross-row constraint.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallet_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub wallet_id: i64,
    pub kind: String,
    pub cash_delta: Decimal,
    pub points_delta: i64,
    pub cash_balance_before: Decimal,
    pub cash_balance_after: Decimal,
    pub points_balance_before: i64,
    pub points_balance_after: i64,
    /// Idempotency key for top-ups and payment callbacks. Unique when
    /// present; NULL for debits, which have no external retry source.
    pub reference: Option<String>,
    pub description: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallet::Entity",
        from = "Column::WalletId",
        to = "super::wallet::Column::Id"
    )]
    Wallet,
}

impl Related<super::wallet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
