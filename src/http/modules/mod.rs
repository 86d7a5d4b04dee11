//! HTTP handler modules, one per resource.

pub mod auth;
pub mod charging;
pub mod health;
pub mod ocpp_commands;
pub mod payment;
pub mod tickets;
