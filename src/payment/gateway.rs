//! Payment gateway adapters: `create_payment`, `verify_callback`,
//! `check_status` over Manual, Billplz (Malaysian FPX), and OCBC (awaiting
//! API docs, placeholder only -- mirrors the upstream integration).

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rand::Rng;
use rust_decimal::Decimal;
use serde_json::Value;
use sha2::Sha256;
use tracing::{error, warn};

use crate::config::AppConfig;

type HmacSha256 = Hmac<Sha256>;

pub struct CreatePaymentResult {
    pub success: bool,
    pub payment_url: Option<String>,
    pub gateway_transaction_id: Option<String>,
    pub gateway_reference: Option<String>,
    pub message: Option<String>,
}

pub struct VerifiedCallback {
    pub valid: bool,
    pub transaction_ref: String,
    pub gateway_transaction_id: String,
    pub status: String,
    pub amount: Decimal,
    pub payment_method: String,
    pub message: Option<String>,
}

pub struct StatusResult {
    pub status: String,
    pub amount: Decimal,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn create_payment(&self, transaction_ref: &str, amount: Decimal, description: &str, customer_email: &str, customer_name: &str) -> CreatePaymentResult;

    /// Parses and authenticates an inbound callback payload. Never trusts
    /// the payload's own claims about success without checking the
    /// signature first.
    fn verify_callback(&self, payload: &Value) -> VerifiedCallback;

    async fn check_status(&self, gateway_transaction_id: &str) -> StatusResult;
}

/// Admin-approved bank transfer. No external API call; callbacks for this
/// gateway are rejected at the HTTP layer before they ever reach here
/// (manual top-ups go through `/api/payment/approve/{ref}` instead).
pub struct ManualGateway;

#[async_trait]
impl PaymentGateway for ManualGateway {
    fn name(&self) -> &'static str {
        "manual"
    }

    async fn create_payment(&self, transaction_ref: &str, _amount: Decimal, _description: &str, _customer_email: &str, _customer_name: &str) -> CreatePaymentResult {
        CreatePaymentResult {
            success: true,
            payment_url: None,
            gateway_transaction_id: Some(format!("MANUAL-{transaction_ref}")),
            gateway_reference: Some(transaction_ref.to_string()),
            message: Some("manual payment created, awaiting admin approval".to_string()),
        }
    }

    fn verify_callback(&self, _payload: &Value) -> VerifiedCallback {
        VerifiedCallback {
            valid: false,
            transaction_ref: String::new(),
            gateway_transaction_id: String::new(),
            status: "failed".to_string(),
            amount: Decimal::ZERO,
            payment_method: "bank_transfer".to_string(),
            message: Some("manual gateway does not accept callbacks".to_string()),
        }
    }

    async fn check_status(&self, _gateway_transaction_id: &str) -> StatusResult {
        StatusResult { status: "pending".to_string(), amount: Decimal::ZERO }
    }
}

pub struct BillplzGateway {
    api_key: String,
    collection_id: String,
    x_signature_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl BillplzGateway {
    fn signing_keys() -> &'static [&'static str] {
        &["amount", "collection_id", "email", "id", "name", "paid", "paid_amount", "paid_at", "state", "url"]
    }

    fn sign(&self, payload: &Value) -> String {
        let sign_string: String = Self::signing_keys()
            .iter()
            .filter_map(|k| payload.get(*k).map(|v| format!("{k}{}", value_as_plain_string(v))))
            .collect::<Vec<_>>()
            .join("|");

        let mut mac = HmacSha256::new_from_slice(self.x_signature_key.as_bytes()).expect("HMAC accepts a key of any length");
        mac.update(sign_string.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

#[async_trait]
impl PaymentGateway for BillplzGateway {
    fn name(&self) -> &'static str {
        "billplz"
    }

    async fn create_payment(&self, transaction_ref: &str, amount: Decimal, description: &str, customer_email: &str, customer_name: &str) -> CreatePaymentResult {
        let cents = (amount * Decimal::new(100, 0)).round().to_string();
        let body = serde_json::json!({
            "collection_id": self.collection_id,
            "email": customer_email,
            "name": if customer_name.is_empty() { "Customer" } else { customer_name },
            "amount": cents,
            "description": description,
            "reference_1_label": "Transaction Ref",
            "reference_1": transaction_ref,
        });

        let response = self.http.post(format!("{}/api/v3/bills", self.base_url)).basic_auth(&self.api_key, Option::<&str>::None).json(&body).send().await;

        match response {
            Ok(resp) if resp.status().is_success() => match resp.json::<Value>().await {
                Ok(data) => {
                    let id = data.get("id").and_then(Value::as_str).map(str::to_string);
                    CreatePaymentResult {
                        success: id.is_some(),
                        payment_url: data.get("url").and_then(Value::as_str).map(str::to_string),
                        gateway_transaction_id: id.clone(),
                        gateway_reference: id,
                        message: None,
                    }
                }
                Err(e) => {
                    error!(error = %e, "failed to parse Billplz create_payment response");
                    CreatePaymentResult { success: false, payment_url: None, gateway_transaction_id: None, gateway_reference: None, message: Some("malformed gateway response".to_string()) }
                }
            },
            Ok(resp) => CreatePaymentResult { success: false, payment_url: None, gateway_transaction_id: None, gateway_reference: None, message: Some(format!("gateway returned {}", resp.status())) },
            Err(e) => {
                error!(error = %e, "Billplz create_payment request failed");
                CreatePaymentResult { success: false, payment_url: None, gateway_transaction_id: None, gateway_reference: None, message: Some(e.to_string()) }
            }
        }
    }

    fn verify_callback(&self, payload: &Value) -> VerifiedCallback {
        let received_sig = payload.get("x_signature").and_then(Value::as_str).unwrap_or("");
        let expected_sig = self.sign(payload);

        if !constant_time_eq(received_sig.as_bytes(), expected_sig.as_bytes()) {
            warn!("Billplz callback signature mismatch");
            return VerifiedCallback {
                valid: false,
                transaction_ref: String::new(),
                gateway_transaction_id: String::new(),
                status: "failed".to_string(),
                amount: Decimal::ZERO,
                payment_method: "fpx".to_string(),
                message: Some("invalid signature".to_string()),
            };
        }

        let paid = payload.get("paid").and_then(Value::as_str) == Some("true");
        let paid_amount_cents = payload.get("paid_amount").and_then(Value::as_str).and_then(|s| s.parse::<i64>().ok()).unwrap_or(0);

        VerifiedCallback {
            valid: true,
            transaction_ref: payload.get("reference_1").and_then(Value::as_str).unwrap_or_default().to_string(),
            gateway_transaction_id: payload.get("id").and_then(Value::as_str).unwrap_or_default().to_string(),
            status: if paid { "success".to_string() } else { "failed".to_string() },
            amount: Decimal::new(paid_amount_cents, 2),
            payment_method: "fpx".to_string(),
            message: None,
        }
    }

    async fn check_status(&self, gateway_transaction_id: &str) -> StatusResult {
        let response = self.http.get(format!("{}/api/v3/bills/{gateway_transaction_id}", self.base_url)).basic_auth(&self.api_key, Option::<&str>::None).send().await;
        match response {
            Ok(resp) => match resp.json::<Value>().await {
                Ok(data) => {
                    let paid = data.get("paid").and_then(Value::as_bool).unwrap_or(false);
                    let amount_cents = data.get("amount").and_then(Value::as_str).and_then(|s| s.parse::<i64>().ok()).unwrap_or(0);
                    StatusResult { status: if paid { "success".to_string() } else { "pending".to_string() }, amount: Decimal::new(amount_cents, 2) }
                }
                Err(_) => StatusResult { status: "error".to_string(), amount: Decimal::ZERO },
            },
            Err(e) => {
                error!(error = %e, "Billplz check_status request failed");
                StatusResult { status: "error".to_string(), amount: Decimal::ZERO }
            }
        }
    }
}

/// Ready for OCBC's API once they publish documentation; until then every
/// call is a documented no-op, matching the upstream placeholder.
pub struct OcbcGateway;

#[async_trait]
impl PaymentGateway for OcbcGateway {
    fn name(&self) -> &'static str {
        "ocbc"
    }

    async fn create_payment(&self, _transaction_ref: &str, _amount: Decimal, _description: &str, _customer_email: &str, _customer_name: &str) -> CreatePaymentResult {
        warn!("OCBC gateway invoked but not yet configured, awaiting API documentation");
        CreatePaymentResult { success: false, payment_url: None, gateway_transaction_id: None, gateway_reference: None, message: Some("OCBC gateway not yet configured".to_string()) }
    }

    fn verify_callback(&self, _payload: &Value) -> VerifiedCallback {
        VerifiedCallback {
            valid: false,
            transaction_ref: String::new(),
            gateway_transaction_id: String::new(),
            status: "failed".to_string(),
            amount: Decimal::ZERO,
            payment_method: "unknown".to_string(),
            message: Some("OCBC callback verification not yet implemented".to_string()),
        }
    }

    async fn check_status(&self, _gateway_transaction_id: &str) -> StatusResult {
        StatusResult { status: "pending".to_string(), amount: Decimal::ZERO }
    }
}

/// Resolves a gateway by name, falling back to `Manual` for unknown names
/// -- mirrors `GATEWAY_REGISTRY.get(name, ManualGateway)` upstream.
pub struct GatewayRegistry {
    billplz: Option<std::sync::Arc<BillplzGateway>>,
}

impl GatewayRegistry {
    pub fn new(config: &AppConfig) -> Self {
        let billplz = match (&config.billplz_api_key, &config.billplz_collection_id, &config.billplz_x_signature_key) {
            (Some(api_key), Some(collection_id), Some(x_signature_key)) => Some(std::sync::Arc::new(BillplzGateway {
                api_key: api_key.clone(),
                collection_id: collection_id.clone(),
                x_signature_key: x_signature_key.clone(),
                base_url: config.billplz_base_url.clone(),
                http: reqwest::Client::new(),
            })),
            _ => None,
        };
        Self { billplz }
    }

    pub fn get(&self, name: &str) -> std::sync::Arc<dyn PaymentGateway> {
        match name {
            "billplz" => match &self.billplz {
                Some(gw) => gw.clone(),
                None => {
                    warn!("billplz gateway requested but not configured, falling back to manual");
                    std::sync::Arc::new(ManualGateway)
                }
            },
            "ocbc" => std::sync::Arc::new(OcbcGateway),
            _ => std::sync::Arc::new(ManualGateway),
        }
    }
}

pub fn generate_transaction_ref(today: chrono::DateTime<chrono::Utc>) -> String {
    let date_str = today.format("%Y%m%d");
    let random_part: String = {
        let mut rng = rand::thread_rng();
        (0..4).map(|_| format!("{:02X}", rng.gen::<u8>())).collect()
    };
    format!("TXN-{date_str}-{random_part}")
}

fn value_as_plain_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_ref_has_expected_shape() {
        let now = chrono::DateTime::parse_from_rfc3339("2026-02-16T00:00:00Z").unwrap().with_timezone(&chrono::Utc);
        let reference = generate_transaction_ref(now);
        assert!(reference.starts_with("TXN-20260216-"));
        assert_eq!(reference.len(), "TXN-20260216-XXXXXXXX".len());
    }

    #[test]
    fn unknown_gateway_name_falls_back_to_manual() {
        let registry = GatewayRegistry::new(&AppConfig::default());
        assert_eq!(registry.get("stripe").name(), "manual");
        assert_eq!(registry.get("ocbc").name(), "ocbc");
    }

    #[test]
    fn constant_time_eq_rejects_different_lengths_and_content() {
        assert!(!constant_time_eq(b"abc", b"ab"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(constant_time_eq(b"abc", b"abc"));
    }
}
