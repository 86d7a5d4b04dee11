//! Create tickets table

use sea_orm_migration::prelude::*;

use super::{m20240101_000005_create_users::Users, m20240101_000009_create_support_staff::SupportStaff};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tickets::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tickets::TicketNumber).string().not_null().unique_key())
                    .col(ColumnDef::new(Tickets::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Tickets::Category).string().not_null())
                    .col(ColumnDef::new(Tickets::Department).string().not_null())
                    .col(ColumnDef::new(Tickets::Priority).string().not_null())
                    .col(ColumnDef::new(Tickets::Status).string().not_null().default("open"))
                    .col(ColumnDef::new(Tickets::Subject).string().not_null())
                    .col(ColumnDef::new(Tickets::AssignedStaffId).big_integer())
                    .col(ColumnDef::new(Tickets::DueAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Tickets::LastReminderAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Tickets::Escalated).boolean().not_null().default(false))
                    .col(ColumnDef::new(Tickets::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Tickets::UpdatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Tickets::ResolvedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Tickets::Table, Tickets::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Tickets::Table, Tickets::AssignedStaffId)
                            .to(SupportStaff::Table, SupportStaff::Id),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_tickets_status_due")
                    .table(Tickets::Table)
                    .col(Tickets::Status)
                    .col(Tickets::DueAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Tickets::Table).to_owned()).await
    }
}

#[derive(Iden)]
pub enum Tickets {
    Table,
    Id,
    TicketNumber,
    UserId,
    Category,
    Department,
    Priority,
    Status,
    Subject,
    AssignedStaffId,
    DueAt,
    LastReminderAt,
    Escalated,
    CreatedAt,
    UpdatedAt,
    ResolvedAt,
}
