//! Create wallets table

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
                    .table(Wallets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Wallets::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Wallets::UserId).big_integer().not_null().unique_key())
                    .col(ColumnDef::new(Wallets::CashBalance).decimal_len(12, 2).not_null().default(0))
                    .col(ColumnDef::new(Wallets::PointsBalance).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Wallets::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Wallets::Table, Wallets::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Wallets::Table).to_owned()).await
    }
}

#[derive(Iden)]
pub enum Wallets {
    Table,
    Id,
    UserId,
    CashBalance,
    PointsBalance,
    UpdatedAt,
}
