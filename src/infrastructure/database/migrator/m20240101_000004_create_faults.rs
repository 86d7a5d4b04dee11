//! Create faults table

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_chargers::Chargers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Faults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Faults::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Faults::ChargePointId).string().not_null())
                    .col(ColumnDef::new(Faults::ConnectorId).integer().not_null())
                    .col(ColumnDef::new(Faults::FaultType).string().not_null())
                    .col(ColumnDef::new(Faults::Info).string())
                    .col(ColumnDef::new(Faults::RaisedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Faults::ClearedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Faults::Table, Faults::ChargePointId)
                            .to(Chargers::Table, Chargers::ChargePointId),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Faults::Table).to_owned()).await
    }
}

#[derive(Iden)]
pub enum Faults {
    Table,
    Id,
    ChargePointId,
    ConnectorId,
    FaultType,
    Info,
    RaisedAt,
    ClearedAt,
}
