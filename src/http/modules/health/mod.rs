//! Health check module.

pub mod handlers;

pub use handlers::*;
