pub mod audit_log;
pub mod charger;
pub mod charging_session;
pub mod fault;
pub mod meter_value;
pub mod payment_transaction;
pub mod support_staff;
pub mod ticket;
pub mod ticket_message;
pub mod user;
pub mod wallet;
pub mod wallet_transaction;
