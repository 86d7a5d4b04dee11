//! Authentication middleware for Axum.
//!
//! Tokens are accepted only via the `Authorization: Bearer` header. An
//! `admin_token` query parameter is not read anywhere in this module --
//! some OCPP backends accept one for convenience, but it ends up in proxy
//! and access logs.

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::jwt::{verify_access_token, AuthError, JwtConfig};

#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub email: String,
    pub is_admin: bool,
}

fn extract_bearer_token(header_value: &str) -> Option<&str> {
    header_value.strip_prefix("Bearer ")
}

pub async fn auth_middleware(State(auth_state): State<AuthState>, mut request: Request<Body>, next: Next) -> Response {
    let auth_header = request.headers().get(header::AUTHORIZATION).and_then(|h| h.to_str().ok()).map(str::to_string);
    let Some(auth_header) = auth_header else {
        return auth_error_response(AuthError::MissingToken);
    };
    let Some(token) = extract_bearer_token(&auth_header) else {
        return auth_error_response(AuthError::InvalidToken);
    };

    match verify_access_token(token, &auth_state.jwt_config) {
        Ok(claims) => {
            let user_id: i64 = match claims.sub.parse() {
                Ok(id) => id,
                Err(_) => return auth_error_response(AuthError::InvalidToken),
            };
            request.extensions_mut().insert(AuthenticatedUser { user_id, email: claims.email, is_admin: claims.is_admin });
            next.run(request).await
        }
        Err(e) => auth_error_response(e),
    }
}

/// Must run after `auth_middleware`; rejects non-admin callers.
pub async fn admin_middleware(request: Request<Body>, next: Next) -> Response {
    match request.extensions().get::<AuthenticatedUser>() {
        Some(user) if user.is_admin => next.run(request).await,
        Some(_) => auth_error_response(AuthError::InsufficientPermissions),
        None => auth_error_response(AuthError::MissingToken),
    }
}

fn auth_error_response(error: AuthError) -> Response {
    let status = match error {
        AuthError::MissingToken | AuthError::InvalidToken | AuthError::ExpiredToken | AuthError::WrongTokenType | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}
