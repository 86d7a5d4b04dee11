//! Create wallet_transactions table

use sea_orm_migration::prelude::*;

use super::m20240101_000006_create_wallets::Wallets;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WalletTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WalletTransactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WalletTransactions::WalletId).big_integer().not_null())
                    .col(ColumnDef::new(WalletTransactions::Kind).string().not_null())
                    .col(ColumnDef::new(WalletTransactions::CashDelta).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(WalletTransactions::PointsDelta).big_integer().not_null())
                    .col(ColumnDef::new(WalletTransactions::CashBalanceBefore).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(WalletTransactions::CashBalanceAfter).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(WalletTransactions::PointsBalanceBefore).big_integer().not_null())
                    .col(ColumnDef::new(WalletTransactions::PointsBalanceAfter).big_integer().not_null())
                    .col(ColumnDef::new(WalletTransactions::Reference).string())
                    .col(ColumnDef::new(WalletTransactions::Description).string().not_null())
                    .col(ColumnDef::new(WalletTransactions::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(WalletTransactions::Table, WalletTransactions::WalletId)
                            .to(Wallets::Table, Wallets::Id),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_wallet_tx_reference")
                    .table(WalletTransactions::Table)
                    .col(WalletTransactions::Reference)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(WalletTransactions::Table).to_owned()).await
    }
}

#[derive(Iden)]
pub enum WalletTransactions {
    Table,
    Id,
    WalletId,
    Kind,
    CashDelta,
    PointsDelta,
    CashBalanceBefore,
    CashBalanceAfter,
    PointsBalanceBefore,
    PointsBalanceAfter,
    Reference,
    Description,
    CreatedAt,
}
