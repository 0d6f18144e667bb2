//! Publish dispatcher.
//!
//! Fans a scheduled item out to its platforms concurrently, records the
//! per-platform outcomes, and commits the resulting status with a
//! compare-and-set so a concurrent transition loses at most one side.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{info, warn};

use domain::models::{ContentStatus, ScheduledContent};
use domain::services::{
    merge_results, platforms_to_attempt, result_from_outcome, NotificationService,
    NotificationType, PlatformPublisher, PublishFailedPayload, PublishPayload,
};

use crate::error::ApiError;
use crate::middleware::metrics::{record_publish_attempt, record_status_conflict};
use persistence::repositories::ContentRepository;

/// Orchestrates one publish attempt for one content item.
#[derive(Clone)]
pub struct PublishDispatcher {
    repo: ContentRepository,
    publisher: Arc<dyn PlatformPublisher>,
    notifier: Arc<dyn NotificationService>,
}

/// Build the adapter payload for a content item.
pub fn payload_for(content: &ScheduledContent) -> PublishPayload {
    PublishPayload {
        content_id: content.id,
        location_id: content.location_id,
        title: content.title.clone(),
        body: content.body.clone(),
        media_urls: content.media_urls.clone(),
    }
}

impl PublishDispatcher {
    pub fn new(
        repo: ContentRepository,
        publisher: Arc<dyn PlatformPublisher>,
        notifier: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            repo,
            publisher,
            notifier,
        }
    }

    /// Run one dispatch attempt for a `scheduled` item.
    ///
    /// Platforms that already succeeded in an earlier attempt are skipped;
    /// their results are kept. The status commit is guarded on the item
    /// still being `scheduled`, so a concurrent dispatch or workflow
    /// action yields a conflict instead of a double publish.
    pub async fn dispatch(
        &self,
        mut content: ScheduledContent,
    ) -> Result<ScheduledContent, ApiError> {
        if content.status != ContentStatus::Scheduled {
            return Err(ApiError::InvalidTransition(format!(
                "cannot dispatch from {}",
                content.status
            )));
        }

        let targets = platforms_to_attempt(&content.platforms, &content.publish_results);
        let payload = payload_for(&content);

        let attempts = targets.iter().map(|&platform| {
            let payload = &payload;
            async move { (platform, self.publisher.publish(platform, payload).await) }
        });
        let outcomes = join_all(attempts).await;

        let now = Utc::now();
        let fresh: Vec<_> = outcomes
            .into_iter()
            .map(|(platform, outcome)| {
                record_publish_attempt(platform.as_str(), outcome.is_ok());
                result_from_outcome(platform, outcome, now)
            })
            .collect();

        let merged = merge_results(&content.publish_results, fresh);
        content.mark_published(merged, now)?;

        let rows = self
            .repo
            .commit_status(&content, ContentStatus::Scheduled)
            .await?;
        if rows == 0 {
            record_status_conflict();
            return Err(ApiError::Conflict(
                "Content status changed concurrently".to_string(),
            ));
        }

        info!(
            content_id = %content.id,
            location_id = %content.location_id,
            status = %content.status,
            platforms = content.platforms.len(),
            attempted = targets.len(),
            "Publish dispatch committed"
        );

        if content.status == ContentStatus::Failed {
            self.notify_failure(&content).await;
        }

        Ok(content)
    }

    /// Best-effort failure notification; logged and swallowed on error.
    async fn notify_failure(&self, content: &ScheduledContent) {
        if !content.workflow.notify_via_telegram {
            return;
        }
        let Some(chat_id) = content.workflow.telegram_chat_id.as_deref() else {
            return;
        };

        let failures: Vec<(String, String)> = content
            .publish_results
            .iter()
            .filter(|r| !r.success)
            .map(|r| {
                (
                    r.platform.to_string(),
                    r.error_reason.clone().unwrap_or_default(),
                )
            })
            .collect();

        let payload = PublishFailedPayload {
            notification_type: NotificationType::PublishFailed,
            content_id: content.id,
            location_id: content.location_id,
            title: content.title.clone(),
            failures,
            timestamp: Utc::now(),
        };

        if let domain::services::NotificationResult::Failed(reason) =
            self.notifier.send_publish_failed(chat_id, payload).await
        {
            warn!(
                content_id = %content.id,
                reason = %reason,
                "Publish-failure notification could not be sent"
            );
        }
    }
}
