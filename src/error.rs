//! Error taxonomy shared by every engine and the HTTP layer.
//!
//! Engines only ever produce `EngineError`. Infrastructure failures
//! (database, crypto, serialization) are folded into `EngineError::Internal`
//! by way of `InfraError`, so callers outside `infrastructure` never see a
//! `sea_orm::DbErr` directly.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation: {0}")]
    Validation(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {entity} {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("charger did not respond in time")]
    TransportTimeout,

    #[error("charger transport error: {0}")]
    Transport(String),

    #[error("gateway error: {0}")]
    Gateway(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl EngineError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        EngineError::NotFound { entity, id: id.into() }
    }
}

impl From<InfraError> for EngineError {
    fn from(err: InfraError) -> Self {
        EngineError::Internal(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("crypto error: {0}")]
    Crypto(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
