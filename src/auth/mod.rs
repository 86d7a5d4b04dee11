//! JWT-based authentication for the HTTP control plane.

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{create_access_token, create_refresh_token, verify_access_token, verify_refresh_token, AccessClaims, AuthError, JwtConfig, RefreshClaims};
pub use middleware::{admin_middleware, auth_middleware, AuthState, AuthenticatedUser};
pub use password::{hash_password, verify_password};
