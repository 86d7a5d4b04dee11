//! Central System (CSMS) for EV charging.
//!
//! Speaks OCPP 1.6-J to chargers over WebSocket, settles wallet/payment
//! transactions, and routes support tickets against an SLA. See
//! `SPEC_FULL.md` for the system contract.

pub mod auth;
pub mod bootstrap;
pub mod clock;
pub mod config;
pub mod domain;
pub mod engines;
pub mod error;
pub mod http;
pub mod infrastructure;
pub mod mailer;
pub mod ocpp;
pub mod payment;
pub mod support;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use error::{EngineError, InfraError};
