//! Outbound mail. The CSMS's mailer is an interface, not a rendering
//! engine -- callers hand over a subject and a pre-rendered body and don't
//! care whether delivery goes over SMTP, a transactional-email API, or (as
//! shipped here) a structured log line consumed by an operator's alerting
//! pipeline.

use async_trait::async_trait;
use tracing::info;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str);
}

/// Default `Mailer`: emits a structured `tracing` event instead of opening
/// an SMTP connection. Swappable for a real transport without touching any
/// caller -- none of the engines construct a `Mailer` themselves, they're
/// handed an `Arc<dyn Mailer>` at wiring time.
pub struct LoggingMailer;

#[async_trait]
impl Mailer for LoggingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) {
        info!(to, subject, body, "mail dispatched");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn logging_mailer_does_not_panic() {
        let mailer = LoggingMailer;
        mailer.send("user@example.com", "Welcome", "Your account is ready.").await;
    }
}
