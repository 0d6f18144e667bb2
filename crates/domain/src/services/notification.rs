//! Workflow notification seam.
//!
//! Notifications are best-effort side effects: a send failure never
//! blocks the workflow transition that triggered it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    ApprovalRequested,
    PublishFailed,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationType::ApprovalRequested => write!(f, "approval_requested"),
            NotificationType::PublishFailed => write!(f, "publish_failed"),
        }
    }
}

/// Payload sent when an item enters review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ApprovalRequestedPayload {
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub content_id: Uuid,
    pub location_id: Uuid,
    pub title: Option<String>,
    pub approvers: Vec<String>,
    pub requested_by: String,
    pub timestamp: DateTime<Utc>,
}

/// Payload sent when a publish attempt leaves an item in `failed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PublishFailedPayload {
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub content_id: Uuid,
    pub location_id: Uuid,
    pub title: Option<String>,
    /// Platform names that failed, with their reasons.
    pub failures: Vec<(String, String)>,
    pub timestamp: DateTime<Utc>,
}

/// Result of a notification send attempt.
#[derive(Debug, Clone)]
pub enum NotificationResult {
    /// Notification was sent successfully.
    Sent,
    /// Notification sending failed (non-blocking).
    Failed(String),
    /// Notification was skipped (workflow does not ask for one).
    Skipped,
}

/// Notification service trait for workflow events.
#[async_trait::async_trait]
pub trait NotificationService: Send + Sync {
    /// Notify approvers that an item awaits review.
    async fn send_approval_requested(
        &self,
        chat_id: &str,
        payload: ApprovalRequestedPayload,
    ) -> NotificationResult;

    /// Notify that a publish attempt failed on at least one platform.
    async fn send_publish_failed(
        &self,
        chat_id: &str,
        payload: PublishFailedPayload,
    ) -> NotificationResult;
}

/// Mock notification service for development and testing.
///
/// Logs notifications but doesn't actually send them.
#[derive(Debug, Clone, Default)]
pub struct MockNotificationService {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
}

impl MockNotificationService {
    pub fn new() -> Self {
        Self {
            simulate_failure: false,
        }
    }

    /// Create a mock service that simulates failures.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
        }
    }
}

#[async_trait::async_trait]
impl NotificationService for MockNotificationService {
    async fn send_approval_requested(
        &self,
        chat_id: &str,
        payload: ApprovalRequestedPayload,
    ) -> NotificationResult {
        if self.simulate_failure {
            tracing::warn!(
                chat_id = %chat_id,
                content_id = %payload.content_id,
                "Mock notification service simulating failure"
            );
            return NotificationResult::Failed("Simulated failure".to_string());
        }

        tracing::info!(
            chat_id = %chat_id,
            content_id = %payload.content_id,
            approvers_count = %payload.approvers.len(),
            requested_by = %payload.requested_by,
            "Mock: Would send approval_requested notification"
        );

        NotificationResult::Sent
    }

    async fn send_publish_failed(
        &self,
        chat_id: &str,
        payload: PublishFailedPayload,
    ) -> NotificationResult {
        if self.simulate_failure {
            tracing::warn!(
                chat_id = %chat_id,
                content_id = %payload.content_id,
                "Mock notification service simulating failure"
            );
            return NotificationResult::Failed("Simulated failure".to_string());
        }

        tracing::info!(
            chat_id = %chat_id,
            content_id = %payload.content_id,
            failures_count = %payload.failures.len(),
            "Mock: Would send publish_failed notification"
        );

        NotificationResult::Sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_type_display() {
        assert_eq!(
            NotificationType::ApprovalRequested.to_string(),
            "approval_requested"
        );
        assert_eq!(NotificationType::PublishFailed.to_string(), "publish_failed");
    }

    #[test]
    fn test_approval_requested_payload_serialization() {
        let payload = ApprovalRequestedPayload {
            notification_type: NotificationType::ApprovalRequested,
            content_id: Uuid::nil(),
            location_id: Uuid::nil(),
            title: Some("Spring sale".to_string()),
            approvers: vec!["lead@agency.test".to_string()],
            requested_by: "author@agency.test".to_string(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"type\":\"approval_requested\""));
        assert!(json.contains("\"requested_by\":\"author@agency.test\""));
    }

    #[tokio::test]
    async fn test_mock_service_sends() {
        let service = MockNotificationService::new();
        let payload = PublishFailedPayload {
            notification_type: NotificationType::PublishFailed,
            content_id: Uuid::nil(),
            location_id: Uuid::nil(),
            title: None,
            failures: vec![("instagram".to_string(), "token expired".to_string())],
            timestamp: Utc::now(),
        };
        let result = service.send_publish_failed("-100123", payload).await;
        assert!(matches!(result, NotificationResult::Sent));
    }

    #[tokio::test]
    async fn test_mock_service_failing() {
        let service = MockNotificationService::failing();
        let payload = ApprovalRequestedPayload {
            notification_type: NotificationType::ApprovalRequested,
            content_id: Uuid::nil(),
            location_id: Uuid::nil(),
            title: None,
            approvers: vec![],
            requested_by: "author@agency.test".to_string(),
            timestamp: Utc::now(),
        };
        let result = service.send_approval_requested("-100123", payload).await;
        assert!(matches!(result, NotificationResult::Failed(_)));
    }
}
