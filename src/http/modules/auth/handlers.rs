//! Auth handlers: credential login and refresh-token exchange.
//!
//! Neither endpoint is in spec.md's "selected critical endpoints" table --
//! that table is explicit that it isn't exhaustive, and a bearer-token
//! control plane has no way to mint the first access token without one.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, State};
use axum::Extension;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use super::dto::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, UserInfo};
use crate::auth::middleware::AuthenticatedUser;
use crate::auth::{create_access_token, create_refresh_token, verify_password, verify_refresh_token, JwtConfig};
use crate::clock::Clock;
use crate::error::EngineError;
use crate::http::common::{ApiError, ApiResponse, ValidatedJson};
use crate::infrastructure::database::entities::user;
use crate::infrastructure::database::store::Store;

type JsonResult<T> = Result<axum::Json<ApiResponse<T>>, ApiError>;

#[derive(Clone)]
pub struct AuthModuleState {
    pub store: Store,
    pub jwt_config: JwtConfig,
    pub clock: Arc<dyn Clock>,
}

pub async fn login(
    State(state): State<AuthModuleState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> JsonResult<LoginResponse> {
    let ip = addr.ip().to_string();
    let now = state.clock.now();

    let found = user::Entity::find().filter(user::Column::Email.eq(&body.email)).one(&state.store.db).await.map_err(EngineError::from)?;
    let user = match found {
        Some(u) => u,
        None => {
            state.store.write_audit(None, "auth.login_failed", Some(&ip), Some(serde_json::json!({"email": body.email})), now).await.map_err(ApiError::from)?;
            return Err(EngineError::Auth("invalid credentials".into()).into());
        }
    };

    if !user.is_active {
        state.store.write_audit(Some(user.id), "auth.login_failed", Some(&ip), Some(serde_json::json!({"reason": "disabled"})), now).await.map_err(ApiError::from)?;
        return Err(EngineError::Auth("account is disabled".into()).into());
    }
    let valid = verify_password(&body.password, &user.password_hash).unwrap_or(false);
    if !valid {
        state.store.write_audit(Some(user.id), "auth.login_failed", Some(&ip), Some(serde_json::json!({"reason": "bad_password"})), now).await.map_err(ApiError::from)?;
        return Err(EngineError::Auth("invalid credentials".into()).into());
    }

    let access_token = create_access_token(user.id, &user.email, user.is_admin, &state.jwt_config).map_err(|e| EngineError::Internal(e.to_string()))?;
    let refresh_token = create_refresh_token(user.id, &state.jwt_config).map_err(|e| EngineError::Internal(e.to_string()))?;

    state.store.write_audit(Some(user.id), "auth.login_succeeded", Some(&ip), None, now).await.map_err(ApiError::from)?;

    Ok(axum::Json(ApiResponse::success(LoginResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_config.access_token_expire_minutes * 60,
        user: UserInfo { id: user.id, email: user.email, full_name: user.full_name, is_admin: user.is_admin },
    })))
}

pub async fn refresh(State(state): State<AuthModuleState>, ValidatedJson(body): ValidatedJson<RefreshRequest>) -> JsonResult<RefreshResponse> {
    let claims = verify_refresh_token(&body.refresh_token, &state.jwt_config).map_err(|e| EngineError::Auth(e.to_string()))?;
    let user_id: i64 = claims.sub.parse().map_err(|_| EngineError::Auth("invalid refresh token".into()))?;

    let user = user::Entity::find_by_id(user_id)
        .one(&state.store.db)
        .await
        .map_err(EngineError::from)?
        .ok_or_else(|| EngineError::Auth("invalid refresh token".into()))?;
    if !user.is_active {
        return Err(EngineError::Auth("account is disabled".into()).into());
    }

    let access_token = create_access_token(user.id, &user.email, user.is_admin, &state.jwt_config).map_err(|e| EngineError::Internal(e.to_string()))?;

    Ok(axum::Json(ApiResponse::success(RefreshResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_config.access_token_expire_minutes * 60,
    })))
}

pub async fn me(State(state): State<AuthModuleState>, Extension(caller): Extension<AuthenticatedUser>) -> JsonResult<UserInfo> {
    let user = user::Entity::find_by_id(caller.user_id)
        .one(&state.store.db)
        .await
        .map_err(EngineError::from)?
        .ok_or_else(|| EngineError::not_found("user", caller.user_id.to_string()))?;

    Ok(axum::Json(ApiResponse::success(UserInfo { id: user.id, email: user.email, full_name: user.full_name, is_admin: user.is_admin })))
}
