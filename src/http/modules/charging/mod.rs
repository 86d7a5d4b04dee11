//! Charging module -- remote start/stop and charger listing.

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
