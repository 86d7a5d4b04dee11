//! Application configuration.
//!
//! Loaded from a TOML file (`~/.config/csms/config.toml` or `$CSMS_CONFIG`)
//! with every field overridable by an environment variable. Missing file is
//! not an error -- defaults apply.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_ocpp_port() -> u16 {
    9000
}

fn default_http_port() -> u16 {
    8000
}

fn default_database_url() -> String {
    "sqlite://csms.db?mode=rwc".to_string()
}

fn default_heartbeat_interval_secs() -> i64 {
    7200
}

fn default_online_window_secs() -> i64 {
    900
}

fn default_call_timeout_secs() -> u64 {
    30
}

fn default_long_call_timeout_secs() -> u64 {
    60
}

fn default_status_notification_grace_secs() -> i64 {
    120
}

fn default_reconnect_trust_window_secs() -> i64 {
    600
}

fn default_access_token_minutes() -> i64 {
    30
}

fn default_refresh_token_days() -> i64 {
    14
}

fn default_reminder_check_minutes() -> u64 {
    5
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_admin_email() -> String {
    "1@admin.com".to_string()
}

fn default_admin_password() -> String {
    "1".to_string()
}

fn default_admin_name() -> String {
    "Admin".to_string()
}

fn default_staff_email() -> String {
    "ahmad@plagsini.com".to_string()
}

fn default_staff_password() -> String {
    "admin123".to_string()
}

fn default_staff_name() -> String {
    "Ahmad".to_string()
}

fn default_staff_department() -> String {
    "support".to_string()
}

fn default_billplz_base_url() -> String {
    "https://www.billplz-sandbox.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_ocpp_port")]
    pub ocpp_port: u16,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: i64,
    #[serde(default = "default_online_window_secs")]
    pub online_window_secs: i64,
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
    #[serde(default = "default_long_call_timeout_secs")]
    pub long_call_timeout_secs: u64,
    #[serde(default = "default_status_notification_grace_secs")]
    pub status_notification_grace_secs: i64,
    #[serde(default = "default_reconnect_trust_window_secs")]
    pub reconnect_trust_window_secs: i64,
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_access_token_minutes")]
    pub access_token_expire_minutes: i64,
    #[serde(default = "default_refresh_token_days")]
    pub refresh_token_expire_days: i64,
    /// Absent means "not configured" -- distinct from an empty string, since
    /// the payment callback endpoint must 503 when this is unset rather than
    /// silently accepting an empty shared secret.
    #[serde(default)]
    pub payment_callback_secret: Option<String>,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    #[serde(default = "default_reminder_check_minutes")]
    pub reminder_check_minutes: u64,
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
    #[serde(default = "default_staff_email")]
    pub staff_email: String,
    #[serde(default = "default_staff_password")]
    pub staff_password: String,
    #[serde(default = "default_staff_name")]
    pub staff_name: String,
    #[serde(default = "default_staff_department")]
    pub staff_department: String,
    #[serde(default)]
    pub billplz_api_key: Option<String>,
    #[serde(default)]
    pub billplz_collection_id: Option<String>,
    #[serde(default)]
    pub billplz_x_signature_key: Option<String>,
    #[serde(default = "default_billplz_base_url")]
    pub billplz_base_url: String,
    /// Absent means mail delivery stays on `LoggingMailer` -- there is no
    /// implicit "use SMTP if these happen to be set" switch.
    #[serde(default)]
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_user: Option<String>,
    #[serde(default)]
    pub smtp_password: Option<String>,
    #[serde(default)]
    pub smtp_from: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            ocpp_port: default_ocpp_port(),
            http_port: default_http_port(),
            database_url: default_database_url(),
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
            online_window_secs: default_online_window_secs(),
            call_timeout_secs: default_call_timeout_secs(),
            long_call_timeout_secs: default_long_call_timeout_secs(),
            status_notification_grace_secs: default_status_notification_grace_secs(),
            reconnect_trust_window_secs: default_reconnect_trust_window_secs(),
            jwt_secret: String::new(),
            access_token_expire_minutes: default_access_token_minutes(),
            refresh_token_expire_days: default_refresh_token_days(),
            payment_callback_secret: None,
            cors_origins: default_cors_origins(),
            reminder_check_minutes: default_reminder_check_minutes(),
            admin_email: default_admin_email(),
            admin_password: default_admin_password(),
            admin_name: default_admin_name(),
            staff_email: default_staff_email(),
            staff_password: default_staff_password(),
            staff_name: default_staff_name(),
            staff_department: default_staff_department(),
            billplz_api_key: None,
            billplz_collection_id: None,
            billplz_x_signature_key: None,
            billplz_base_url: default_billplz_base_url(),
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_user: None,
            smtp_password: None,
            smtp_from: None,
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = env::var("CSMS_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs_next::config_dir().map(|dir| dir.join("csms").join("config.toml"))
    }

    /// Load from `CSMS_CONFIG`/the default config path if present, then
    /// apply environment variable overrides.
    pub fn load() -> Self {
        let mut cfg = Self::config_path()
            .and_then(|path| std::fs::read_to_string(path).ok())
            .and_then(|raw| toml::from_str(&raw).ok())
            .unwrap_or_default();
        cfg.apply_env_overrides();
        cfg
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database_url = v;
        }
        if let Ok(v) = env::var("JWT_SECRET_KEY") {
            self.jwt_secret = v;
        }
        if let Ok(v) = env::var("PAYMENT_CALLBACK_SECRET") {
            self.payment_callback_secret = Some(v);
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("ACCESS_TOKEN_EXPIRE_MINUTES") {
            if let Ok(n) = v.parse() {
                self.access_token_expire_minutes = n;
            }
        }
        if let Ok(v) = env::var("REFRESH_TOKEN_EXPIRE_DAYS") {
            if let Ok(n) = v.parse() {
                self.refresh_token_expire_days = n;
            }
        }
        if let Ok(v) = env::var("REMINDER_CHECK_MINUTES") {
            if let Ok(n) = v.parse() {
                self.reminder_check_minutes = n;
            }
        }
        if let Ok(v) = env::var("ADMIN_EMAIL") {
            self.admin_email = v;
        }
        if let Ok(v) = env::var("ADMIN_PASSWORD") {
            self.admin_password = v;
        }
        if let Ok(v) = env::var("ADMIN_NAME") {
            self.admin_name = v;
        }
        if let Ok(v) = env::var("STAFF_EMAIL") {
            self.staff_email = v;
        }
        if let Ok(v) = env::var("STAFF_PASSWORD") {
            self.staff_password = v;
        }
        if let Ok(v) = env::var("STAFF_NAME") {
            self.staff_name = v;
        }
        if let Ok(v) = env::var("STAFF_DEPARTMENT") {
            self.staff_department = v;
        }
        if let Ok(v) = env::var("BILLPLZ_API_KEY") {
            self.billplz_api_key = Some(v);
        }
        if let Ok(v) = env::var("BILLPLZ_COLLECTION_ID") {
            self.billplz_collection_id = Some(v);
        }
        if let Ok(v) = env::var("BILLPLZ_X_SIGNATURE_KEY") {
            self.billplz_x_signature_key = Some(v);
        }
        if let Ok(v) = env::var("BILLPLZ_BASE_URL") {
            self.billplz_base_url = v;
        }
        if let Ok(v) = env::var("SMTP_HOST") {
            self.smtp_host = Some(v);
        }
        if let Ok(v) = env::var("SMTP_PORT") {
            if let Ok(n) = v.parse() {
                self.smtp_port = n;
            }
        }
        if let Ok(v) = env::var("SMTP_USER") {
            self.smtp_user = Some(v);
        }
        if let Ok(v) = env::var("SMTP_PASSWORD") {
            self.smtp_password = Some(v);
        }
        if let Ok(v) = env::var("SMTP_FROM") {
            self.smtp_from = Some(v);
        }
    }

    pub fn ocpp_address(&self) -> String {
        format!("{}:{}", self.host, self.ocpp_port)
    }

    pub fn http_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.heartbeat_interval_secs, 7200);
        assert_eq!(cfg.online_window_secs, 900);
        assert_eq!(cfg.status_notification_grace_secs, 120);
        assert!(cfg.payment_callback_secret.is_none());
    }
}
