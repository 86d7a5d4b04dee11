//! JWT token issuance and verification. Two claim shapes share one HMAC
//! secret: access tokens carry the identity the control plane authorizes
//! against, refresh tokens carry only enough to mint a new access token.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    pub sub: String,
    pub email: String,
    pub is_admin: bool,
    #[serde(rename = "type")]
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    pub sub: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    WrongTokenType,
    InsufficientPermissions,
    InvalidCredentials,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingToken => write!(f, "missing authentication token"),
            Self::InvalidToken => write!(f, "invalid authentication token"),
            Self::ExpiredToken => write!(f, "token has expired"),
            Self::WrongTokenType => write!(f, "wrong token type for this endpoint"),
            Self::InsufficientPermissions => write!(f, "insufficient permissions"),
            Self::InvalidCredentials => write!(f, "invalid credentials"),
        }
    }
}

impl std::error::Error for AuthError {}

pub fn create_access_token(user_id: i64, email: &str, is_admin: bool, config: &JwtConfig) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = AccessClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        is_admin,
        token_type: "access".to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(config.access_token_expire_minutes)).timestamp(),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(config.secret.as_bytes()))
}

pub fn create_refresh_token(user_id: i64, config: &JwtConfig) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = RefreshClaims {
        sub: user_id.to_string(),
        token_type: "refresh".to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::days(config.refresh_token_expire_days)).timestamp(),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(config.secret.as_bytes()))
}

pub fn verify_access_token(token: &str, config: &JwtConfig) -> Result<AccessClaims, AuthError> {
    let data = decode::<AccessClaims>(token, &DecodingKey::from_secret(config.secret.as_bytes()), &Validation::default()).map_err(|e| map_jwt_error(&e))?;
    if data.claims.token_type != "access" {
        return Err(AuthError::WrongTokenType);
    }
    Ok(data.claims)
}

pub fn verify_refresh_token(token: &str, config: &JwtConfig) -> Result<RefreshClaims, AuthError> {
    let data = decode::<RefreshClaims>(token, &DecodingKey::from_secret(config.secret.as_bytes()), &Validation::default()).map_err(|e| map_jwt_error(&e))?;
    if data.claims.token_type != "refresh" {
        return Err(AuthError::WrongTokenType);
    }
    Ok(data.claims)
}

fn map_jwt_error(e: &jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;
    match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig { secret: "test-secret".to_string(), access_token_expire_minutes: 30, refresh_token_expire_days: 7 }
    }

    #[test]
    fn access_token_round_trips_and_carries_admin_flag() {
        let config = config();
        let token = create_access_token(42, "operator@example.com", true, &config).unwrap();
        let claims = verify_access_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "42");
        assert!(claims.is_admin);
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn refresh_token_rejected_at_the_access_verifier() {
        let config = config();
        let refresh = create_refresh_token(1, &config).unwrap();
        let result = verify_access_token(&refresh, &config);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }
}
