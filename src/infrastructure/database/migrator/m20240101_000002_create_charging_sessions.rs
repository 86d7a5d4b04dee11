//! Create charging_sessions table

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
                    .table(ChargingSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChargingSessions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChargingSessions::ChargePointId).string().not_null())
                    .col(ColumnDef::new(ChargingSessions::ConnectorId).integer().not_null())
                    .col(ColumnDef::new(ChargingSessions::TransactionId).big_integer().not_null())
                    .col(ColumnDef::new(ChargingSessions::IdTag).string().not_null())
                    .col(ColumnDef::new(ChargingSessions::Status).string().not_null().default("pending"))
                    .col(ColumnDef::new(ChargingSessions::MeterStartWh).big_integer().not_null())
                    .col(ColumnDef::new(ChargingSessions::MeterStopWh).big_integer())
                    .col(ColumnDef::new(ChargingSessions::EnergyKwh).decimal_len(12, 3).not_null().default(0))
                    .col(ColumnDef::new(ChargingSessions::StartedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(ChargingSessions::StoppedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(ChargingSessions::StopReason).string())
                    .col(ColumnDef::new(ChargingSessions::LastSeenAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(ChargingSessions::Table, ChargingSessions::ChargePointId)
                            .to(Chargers::Table, Chargers::ChargePointId),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_sessions_charge_point_status")
                    .table(ChargingSessions::Table)
                    .col(ChargingSessions::ChargePointId)
                    .col(ChargingSessions::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ChargingSessions::Table).to_owned()).await
    }
}

#[derive(Iden)]
pub enum ChargingSessions {
    Table,
    Id,
    ChargePointId,
    ConnectorId,
    TransactionId,
    IdTag,
    Status,
    MeterStartWh,
    MeterStopWh,
    EnergyKwh,
    StartedAt,
    StoppedAt,
    StopReason,
    LastSeenAt,
}
