//! Periodic background task that drives `TicketEngine::run_sla_sweep`.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::engines::TicketEngine;
use crate::support::shutdown::ShutdownSignal;

pub struct ReminderScheduler {
    ticket_engine: Arc<TicketEngine>,
    check_interval: Duration,
}

impl ReminderScheduler {
    pub fn new(ticket_engine: Arc<TicketEngine>, check_interval_minutes: u64) -> Self {
        Self { ticket_engine, check_interval: Duration::from_secs(check_interval_minutes.max(1) * 60) }
    }

    /// Runs until `shutdown` fires. A failed sweep is logged and the loop
    /// continues on the next tick rather than tearing down the task.
    pub async fn run(&self, shutdown: ShutdownSignal) {
        let mut ticker = tokio::time::interval(self.check_interval);
        info!(interval_secs = self.check_interval.as_secs(), "reminder scheduler started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.ticket_engine.run_sla_sweep().await {
                        Ok(count) if count > 0 => info!(count, "SLA sweep escalated overdue tickets"),
                        Ok(_) => {}
                        Err(e) => error!(error = %e, "SLA sweep failed"),
                    }
                }
                _ = shutdown.wait() => {
                    info!("reminder scheduler shutting down");
                    break;
                }
            }
        }
    }
}
