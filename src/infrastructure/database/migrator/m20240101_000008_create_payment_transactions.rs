//! Create payment_transactions table

use sea_orm_migration::prelude::*;

use super::m20240101_000005_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PaymentTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentTransactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PaymentTransactions::TransactionRef).string().not_null().unique_key())
                    .col(ColumnDef::new(PaymentTransactions::UserId).big_integer().not_null())
                    .col(ColumnDef::new(PaymentTransactions::Gateway).string().not_null())
                    .col(ColumnDef::new(PaymentTransactions::GatewayTransactionId).string())
                    .col(ColumnDef::new(PaymentTransactions::Amount).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(PaymentTransactions::Status).string().not_null().default("pending"))
                    .col(ColumnDef::new(PaymentTransactions::RawStatus).string())
                    .col(ColumnDef::new(PaymentTransactions::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(PaymentTransactions::SettledAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .from(PaymentTransactions::Table, PaymentTransactions::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(PaymentTransactions::Table).to_owned()).await
    }
}

#[derive(Iden)]
pub enum PaymentTransactions {
    Table,
    Id,
    TransactionRef,
    UserId,
    Gateway,
    GatewayTransactionId,
    Amount,
    Status,
    RawStatus,
    CreatedAt,
    SettledAt,
}
