//! Payment gateway abstraction: adapters over external payment providers,
//! selected by name from a small registry.

pub mod gateway;

pub use gateway::{constant_time_eq, generate_transaction_ref, GatewayRegistry, PaymentGateway};
