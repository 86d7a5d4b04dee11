//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_chargers;
mod m20240101_000002_create_charging_sessions;
mod m20240101_000003_create_meter_values;
mod m20240101_000004_create_faults;
mod m20240101_000005_create_users;
mod m20240101_000006_create_wallets;
mod m20240101_000007_create_wallet_transactions;
mod m20240101_000008_create_payment_transactions;
mod m20240101_000009_create_support_staff;
mod m20240101_000010_create_tickets;
mod m20240101_000011_create_ticket_messages;
mod m20240101_000012_create_audit_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_chargers::Migration),
            Box::new(m20240101_000002_create_charging_sessions::Migration),
            Box::new(m20240101_000003_create_meter_values::Migration),
            Box::new(m20240101_000004_create_faults::Migration),
            Box::new(m20240101_000005_create_users::Migration),
            Box::new(m20240101_000006_create_wallets::Migration),
            Box::new(m20240101_000007_create_wallet_transactions::Migration),
            Box::new(m20240101_000008_create_payment_transactions::Migration),
            Box::new(m20240101_000009_create_support_staff::Migration),
            Box::new(m20240101_000010_create_tickets::Migration),
            Box::new(m20240101_000011_create_ticket_messages::Migration),
            Box::new(m20240101_000012_create_audit_logs::Migration),
        ]
    }
}
