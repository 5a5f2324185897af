use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::interval;
use tracing::{debug, error, info};

use crate::config::FollowUpConfig;
use crate::dto::follow_up_dto::SchedulerRunReport;
use crate::service::follow_up_service::FollowUpCoordinator;
use crate::util::error::ServiceResult;

/// Background loop expiring overdue quotes and sending due follow-ups.
/// The only place where quotes expire on their own.
pub struct FollowUpScheduler {
    coordinator: Arc<dyn FollowUpCoordinator>,
    poll_interval: Duration,
}

impl FollowUpScheduler {
    pub fn new(coordinator: Arc<dyn FollowUpCoordinator>, config: &FollowUpConfig) -> Self {
        FollowUpScheduler {
            coordinator,
            poll_interval: Duration::from_secs(config.scheduler_interval_secs),
        }
    }

    /// Spawn the scheduler loop, `None` when follow-ups are disabled
    pub fn spawn(
        coordinator: Arc<dyn FollowUpCoordinator>,
        config: &FollowUpConfig,
    ) -> Option<tokio::task::JoinHandle<()>> {
        if !config.enabled {
            info!("Follow-up scheduler disabled");
            return None;
        }
        let scheduler = Self::new(coordinator, config);
        Some(tokio::spawn(async move {
            scheduler.start().await;
        }))
    }

    async fn start(&self) {
        info!("Starting follow-up scheduler with interval {:?}", self.poll_interval);
        let mut interval = interval(self.poll_interval);

        loop {
            interval.tick().await;
            if let Err(e) = self.run_once().await {
                error!("Error running follow-up scheduler: {}", e);
            }
        }
    }

    /// One pass: expirations first so that expired quotes get no reminder
    pub async fn run_once(&self) -> ServiceResult<SchedulerRunReport> {
        let now = Utc::now();
        let expired = self.coordinator.expire_due_quotes(now.date_naive()).await?;
        let mut report = self.coordinator.process_due_follow_ups(now).await?;
        report.expired = expired;

        if report.expired + report.follow_ups_sent + report.follow_ups_failed + report.follow_ups_stopped > 0 {
            info!(
                expired = report.expired,
                sent = report.follow_ups_sent,
                failed = report.follow_ups_failed,
                stopped = report.follow_ups_stopped,
                "Scheduler pass complete"
            );
        } else {
            debug!("Scheduler pass: nothing to do");
        }
        Ok(report)
    }
}
