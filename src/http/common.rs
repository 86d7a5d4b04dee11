//! Shared HTTP plumbing: the response envelope, the validated-JSON
//! extractor, and the `EngineError` -> status code mapping every handler
//! goes through.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::EngineError;

/// All REST endpoints return data wrapped in this envelope: `{"success":
/// true, "data": ...}` on success, `{"success": false, "error": "..."}` on
/// failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(message.into()) }
    }
}

/// Wraps an `EngineError` with the status code it maps to (spec §7), so a
/// handler can `.map_err(ApiError)?` and get a correctly-coded JSON body.
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError(err)
    }
}

fn status_for(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::Auth(_) => StatusCode::UNAUTHORIZED,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::TransportTimeout => StatusCode::GATEWAY_TIMEOUT,
        EngineError::Transport(_) => StatusCode::BAD_GATEWAY,
        EngineError::Gateway(_) => StatusCode::BAD_GATEWAY,
        EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if matches!(self.0, EngineError::Internal(_)) {
            tracing::error!(error = %self.0, "internal error surfaced to HTTP layer");
        }
        (status, Json(ApiResponse::<()>::error(self.0.to_string()))).into_response()
    }
}

/// `axum::Json` plus `validator::Validate`. On failure returns a 422 body in
/// the same `ApiResponse` envelope as everything else.
pub struct ValidatedJson<T>(pub T);

pub enum ValidatedJsonRejection {
    Json(JsonRejection),
    Validation(validator::ValidationErrors),
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Json(rejection) => (StatusCode::BAD_REQUEST, Json(ApiResponse::<()>::error(format!("invalid JSON: {rejection}")))).into_response(),
            Self::Validation(errors) => {
                let fields: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errs)| {
                        errs.iter().map(move |e| {
                            let msg = e.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| format!("{:?}", e.code));
                            format!("{field}: {msg}")
                        })
                    })
                    .collect();
                let message = if fields.is_empty() { "validation failed".to_string() } else { fields.join("; ") };
                (StatusCode::UNPROCESSABLE_ENTITY, Json(ApiResponse::<()>::error(message))).into_response()
            }
        }
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(ValidatedJsonRejection::Json)?;
        value.validate().map_err(ValidatedJsonRejection::Validation)?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_and_not_found_map_to_expected_status() {
        assert_eq!(status_for(&EngineError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&EngineError::not_found("wallet", "1")), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&EngineError::Forbidden("x".into())), StatusCode::FORBIDDEN);
        assert_eq!(status_for(&EngineError::TransportTimeout), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(status_for(&EngineError::Unavailable("x".into())), StatusCode::SERVICE_UNAVAILABLE);
    }
}
