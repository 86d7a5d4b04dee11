//! Create support_staff table

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
                    .table(SupportStaff::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SupportStaff::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SupportStaff::UserId).big_integer().not_null().unique_key())
                    .col(ColumnDef::new(SupportStaff::Department).string().not_null())
                    .col(ColumnDef::new(SupportStaff::IsManager).boolean().not_null().default(false))
                    .col(ColumnDef::new(SupportStaff::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(SupportStaff::OpenTicketCount).big_integer().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .from(SupportStaff::Table, SupportStaff::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SupportStaff::Table).to_owned()).await
    }
}

#[derive(Iden)]
pub enum SupportStaff {
    Table,
    Id,
    UserId,
    Department,
    IsManager,
    IsActive,
    OpenTicketCount,
}
