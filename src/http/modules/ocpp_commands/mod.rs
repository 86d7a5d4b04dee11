//! Admin-only outbound OCPP command module.

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
