//! Wallet top-up, gateway callback, and manual-approval handlers.
//!
//! `/api/payment/topup` carries a `user_id` in its body, so unlike the
//! charging endpoints it is an "owner" route (spec.md): any caller may
//! top up their own wallet, only an admin may top up someone else's.

use std::sync::Arc;

use axum::extract::{Extension, Path, State};
use axum::http::HeaderMap;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use super::dto::{ApproveResponse, CallbackPayload, CallbackResponse, TopupRequest, TopupResponse};
use crate::auth::middleware::AuthenticatedUser;
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::engines::wallet_engine::WalletEngine;
use crate::error::EngineError;
use crate::http::common::{ApiError, ApiResponse, ValidatedJson};
use crate::infrastructure::database::entities::{payment_transaction, user};
use crate::infrastructure::database::store::Store;
use crate::payment::{constant_time_eq, generate_transaction_ref, GatewayRegistry};

type JsonResult<T> = Result<axum::Json<ApiResponse<T>>, ApiError>;

#[derive(Clone)]
pub struct PaymentState {
    pub store: Store,
    pub wallet_engine: Arc<WalletEngine>,
    pub gateways: Arc<GatewayRegistry>,
    pub config: Arc<AppConfig>,
    pub clock: Arc<dyn Clock>,
}

pub async fn topup(
    State(state): State<PaymentState>,
    Extension(caller): Extension<AuthenticatedUser>,
    ValidatedJson(body): ValidatedJson<TopupRequest>,
) -> JsonResult<TopupResponse> {
    if !caller.is_admin && caller.user_id != body.user_id {
        state
            .store
            .write_audit(Some(caller.user_id), "wallet.topup_forbidden", None, Some(serde_json::json!({"target_user_id": body.user_id})), state.clock.now())
            .await
            .map_err(ApiError::from)?;
        return Err(EngineError::Forbidden("cannot top up another user's wallet".into()).into());
    }

    state.wallet_engine.validate_topup(body.amount).map_err(ApiError::from)?;

    let customer = user::Entity::find_by_id(body.user_id)
        .one(&state.store.db)
        .await
        .map_err(EngineError::from)?
        .ok_or_else(|| EngineError::not_found("user", body.user_id.to_string()))?;

    let gateway_name = body.gateway_name.as_deref().unwrap_or("manual");
    let gateway = state.gateways.get(gateway_name);
    let transaction_ref = generate_transaction_ref(state.clock.now());

    let result = gateway
        .create_payment(&transaction_ref, body.amount, "wallet top-up", &customer.email, &customer.full_name)
        .await;

    let status = if result.success { "pending" } else { "failed" };

    let record = payment_transaction::ActiveModel {
        transaction_ref: Set(transaction_ref.clone()),
        user_id: Set(body.user_id),
        gateway: Set(gateway.name().to_string()),
        gateway_transaction_id: Set(result.gateway_transaction_id),
        amount: Set(body.amount),
        status: Set(status.to_string()),
        raw_status: Set(result.message.clone()),
        created_at: Set(state.clock.now()),
        settled_at: Set(None),
        ..Default::default()
    };
    record.insert(&state.store.db).await.map_err(EngineError::from)?;

    if !result.success {
        state
            .store
            .write_audit(Some(body.user_id), "wallet.topup_gateway_error", None, Some(serde_json::json!({"transaction_ref": transaction_ref})), state.clock.now())
            .await
            .map_err(ApiError::from)?;
        return Err(EngineError::Gateway(result.message.unwrap_or_else(|| "payment creation failed".to_string())).into());
    }

    Ok(axum::Json(ApiResponse::success(TopupResponse { transaction_ref, payment_url: result.payment_url, status: status.to_string() })))
}

pub async fn callback(
    State(state): State<PaymentState>,
    Path(gateway_name): Path<String>,
    headers: HeaderMap,
    axum::Json(payload): axum::Json<CallbackPayload>,
) -> JsonResult<CallbackResponse> {
    if gateway_name == "manual" {
        return Err(EngineError::Validation("manual gateway does not accept callbacks".into()).into());
    }

    let expected = state.config.payment_callback_secret.as_deref().ok_or_else(|| EngineError::Unavailable("payment callback secret is not configured".into()))?;
    let received = headers.get("X-Callback-Secret").and_then(|v| v.to_str().ok()).unwrap_or("");
    if !constant_time_eq(received.as_bytes(), expected.as_bytes()) {
        return Err(EngineError::Auth("invalid callback secret".into()).into());
    }

    let gateway = state.gateways.get(&gateway_name);
    let verified = gateway.verify_callback(&payload);
    if !verified.valid {
        state
            .store
            .write_audit(None, "wallet.callback_gateway_error", None, Some(serde_json::json!({"gateway": gateway_name})), state.clock.now())
            .await
            .map_err(ApiError::from)?;
        return Err(EngineError::Gateway(verified.message.unwrap_or_else(|| "callback signature invalid".to_string())).into());
    }

    let existing = payment_transaction::Entity::find()
        .filter(payment_transaction::Column::TransactionRef.eq(&verified.transaction_ref))
        .one(&state.store.db)
        .await
        .map_err(EngineError::from)?
        .ok_or_else(|| EngineError::not_found("payment_transaction", verified.transaction_ref.clone()))?;

    if existing.status == "success" {
        return Ok(axum::Json(ApiResponse::success(CallbackResponse { processed: true })));
    }

    let now = state.clock.now();
    let mut am: payment_transaction::ActiveModel = existing.clone().into();
    am.status = Set(verified.status.clone());
    am.gateway_transaction_id = Set(Some(verified.gateway_transaction_id.clone()));
    am.raw_status = Set(verified.message.clone());
    if verified.status == "success" {
        am.settled_at = Set(Some(now));
    }
    let updated = am.update(&state.store.db).await.map_err(EngineError::from)?;

    if verified.status == "success" {
        state.wallet_engine.credit_from_payment(&updated).await.map_err(ApiError::from)?;
    }

    Ok(axum::Json(ApiResponse::success(CallbackResponse { processed: true })))
}

pub async fn approve(State(state): State<PaymentState>, Path(transaction_ref): Path<String>) -> JsonResult<ApproveResponse> {
    let existing = payment_transaction::Entity::find()
        .filter(payment_transaction::Column::TransactionRef.eq(&transaction_ref))
        .one(&state.store.db)
        .await
        .map_err(EngineError::from)?
        .ok_or_else(|| EngineError::not_found("payment_transaction", transaction_ref.clone()))?;

    if existing.gateway != "manual" {
        return Err(EngineError::Validation("only manual-gateway transactions can be approved".into()).into());
    }
    if existing.status == "success" {
        return Ok(axum::Json(ApiResponse::success(ApproveResponse { transaction_ref, status: existing.status })));
    }

    let mut am: payment_transaction::ActiveModel = existing.clone().into();
    am.status = Set("success".to_string());
    am.settled_at = Set(Some(state.clock.now()));
    let updated = am.update(&state.store.db).await.map_err(EngineError::from)?;

    state.wallet_engine.credit_from_payment(&updated).await.map_err(ApiError::from)?;

    Ok(axum::Json(ApiResponse::success(ApproveResponse { transaction_ref, status: updated.status })))
}
