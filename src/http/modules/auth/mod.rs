//! Auth module -- login, refresh, current-user profile.

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
