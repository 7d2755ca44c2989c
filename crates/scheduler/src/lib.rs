//! Background scheduler for campussync.
//!
//! Runs the escalation sweep on a fixed interval as a detached tokio
//! task. Escalation happens only here, never inline in request handlers.

use std::sync::Arc;
use std::time::Duration;

use campussync_common::Config;
use campussync_core::EscalationService;
use chrono::Utc;
use tokio::time::interval;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between escalation sweeps (default: 24 hours).
    pub sweep_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(24 * 3600),
        }
    }
}

impl SchedulerConfig {
    /// Build from application configuration.
    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        Self {
            sweep_interval: Duration::from_secs(config.escalation.sweep_interval_hours * 3600),
        }
    }
}

/// Job executor trait for scheduled jobs.
#[async_trait::async_trait]
pub trait JobExecutor: Send + Sync {
    /// Escalate complaints older than the configured threshold.
    async fn escalate_stale_complaints(
        &self,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;
}

/// Executor backed by the escalation service.
pub struct EscalationExecutor {
    escalation: EscalationService,
}

impl EscalationExecutor {
    /// Create a new escalation executor.
    #[must_use]
    pub const fn new(escalation: EscalationService) -> Self {
        Self { escalation }
    }
}

#[async_trait::async_trait]
impl JobExecutor for EscalationExecutor {
    async fn escalate_stale_complaints(
        &self,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        let count = self.escalation.sweep(Utc::now()).await?;
        Ok(count)
    }
}

/// Run the scheduler with the given configuration and executor.
pub async fn run_scheduler<E: JobExecutor + 'static>(config: SchedulerConfig, executor: Arc<E>) {
    let sweep_interval = config.sweep_interval;

    tokio::spawn(async move {
        let mut interval = interval(sweep_interval);
        loop {
            interval.tick().await;
            match executor.escalate_stale_complaints().await {
                Ok(count) => {
                    if count > 0 {
                        tracing::info!(count, "Escalated stale complaints");
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Escalation sweep failed");
                }
            }
        }
    });
}
