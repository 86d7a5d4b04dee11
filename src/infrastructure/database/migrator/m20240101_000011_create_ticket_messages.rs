//! Create ticket_messages table

use sea_orm_migration::prelude::*;

use super::m20240101_000010_create_tickets::Tickets;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TicketMessages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TicketMessages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TicketMessages::TicketId).big_integer().not_null())
                    .col(ColumnDef::new(TicketMessages::AuthorUserId).big_integer())
                    .col(ColumnDef::new(TicketMessages::Body).text().not_null())
                    .col(ColumnDef::new(TicketMessages::IsSystem).boolean().not_null().default(false))
                    .col(ColumnDef::new(TicketMessages::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(TicketMessages::Table, TicketMessages::TicketId)
                            .to(Tickets::Table, Tickets::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TicketMessages::Table).to_owned()).await
    }
}

#[derive(Iden)]
pub enum TicketMessages {
    Table,
    Id,
    TicketId,
    AuthorUserId,
    Body,
    IsSystem,
    CreatedAt,
}
