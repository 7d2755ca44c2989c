//! Auto-escalation of stale complaints.

use campussync_common::{AppResult, Config};
use campussync_db::{entities::complaint::Status, repositories::ComplaintRepository};
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::services::lifecycle::{Actor, LifecycleService};

/// Note recorded on every system-initiated escalation.
const ESCALATION_NOTE: &str = "System auto-escalation (> 3 days).";

/// Escalation service sweeping stale complaints into the Escalated state.
#[derive(Clone)]
pub struct EscalationService {
    complaint_repo: ComplaintRepository,
    lifecycle: LifecycleService,
    threshold_days: i64,
}

impl EscalationService {
    /// Create a new escalation service.
    #[must_use]
    pub fn new(
        complaint_repo: ComplaintRepository,
        lifecycle: LifecycleService,
        config: &Config,
    ) -> Self {
        Self {
            complaint_repo,
            lifecycle,
            threshold_days: config.escalation.threshold_days,
        }
    }

    /// Escalate every complaint older than the threshold that is still in
    /// a non-terminal state. Returns the number of complaints escalated.
    ///
    /// Each complaint transitions in its own transaction; one failure is
    /// logged and the sweep continues. Re-running without time advancing
    /// escalates nothing new.
    pub async fn sweep(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let cutoff = now - Duration::days(self.threshold_days);
        let stale = self.complaint_repo.find_stale(cutoff).await?;

        let mut escalated = 0u64;
        for complaint in stale {
            match self
                .lifecycle
                .apply_transition(
                    &complaint.id,
                    Status::Escalated,
                    Actor::System,
                    Some(ESCALATION_NOTE.to_string()),
                )
                .await
            {
                Ok(Some(_)) => {
                    info!(complaint_id = %complaint.id, "Escalated stale complaint");
                    escalated += 1;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(complaint_id = %complaint.id, error = %e, "Failed to escalate complaint");
                }
            }
        }

        Ok(escalated)
    }
}
