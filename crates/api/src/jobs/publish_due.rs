//! Background job that publishes due scheduled content.

use super::scheduler::{Job, JobFrequency};
use crate::services::PublishDispatcher;
use chrono::Utc;
use persistence::repositories::ContentRepository;
use tracing::{info, warn};

/// Scans for `scheduled` items whose publish instant has passed and
/// dispatches each one. Only one-shot schedules carry a due instant;
/// recurring schedules are materialized into one-shot items upstream.
pub struct PublishDueJob {
    repo: ContentRepository,
    dispatcher: PublishDispatcher,
    interval_secs: u64,
    batch_size: i64,
}

impl PublishDueJob {
    pub fn new(
        repo: ContentRepository,
        dispatcher: PublishDispatcher,
        interval_secs: u64,
        batch_size: i64,
    ) -> Self {
        Self {
            repo,
            dispatcher,
            interval_secs,
            batch_size,
        }
    }
}

#[async_trait::async_trait]
impl Job for PublishDueJob {
    fn name(&self) -> &'static str {
        "publish_due"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(self.interval_secs)
    }

    async fn execute(&self) -> Result<(), String> {
        let due = self
            .repo
            .find_due(Utc::now(), self.batch_size)
            .await
            .map_err(|e| format!("Failed to scan due content: {}", e))?;

        if due.is_empty() {
            return Ok(());
        }

        info!(count = due.len(), "Dispatching due content");

        let mut failures = 0;
        for content in due {
            let id = content.id;
            if let Err(e) = self.dispatcher.dispatch(content).await {
                // Conflicts mean another dispatcher got there first; both
                // are logged and the batch continues.
                warn!(content_id = %id, error = %e, "Due dispatch skipped");
                failures += 1;
            }
        }

        if failures > 0 {
            warn!(failures, "Some due dispatches did not complete");
        }
        Ok(())
    }
}
