//! Scheduled content domain model and workflow transitions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::EngineError;
use crate::models::platform::{Platform, PlatformResult};
use crate::models::schedule::Schedule;
use crate::models::status::{ContentStatus, WorkflowAction};
use crate::models::template::ContentTemplate;
use crate::models::workflow::{ApprovalEntry, WorkflowSettings};

/// Actor recorded on transitions the engine performs itself.
const SYSTEM_ACTOR: &str = "system";

/// A piece of authored or AI-generated content moving through the
/// approval workflow towards a multi-platform publish event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScheduledContent {
    pub id: Uuid,
    /// Owning tenant.
    pub location_id: Uuid,
    /// Weak reference: a dangling template id is treated as "no template".
    pub template_id: Option<Uuid>,
    pub title: Option<String>,
    pub body: String,
    pub media_urls: Vec<String>,
    /// Non-empty set of publish targets.
    pub platforms: Vec<Platform>,
    pub schedule: Schedule,
    pub workflow: WorkflowSettings,
    pub status: ContentStatus,
    pub ai_generated: bool,
    pub ai_provider: Option<String>,
    pub created_by: String,
    /// Per-platform outcomes of the most recent publish attempts.
    /// Successes persist across retries.
    pub publish_results: Vec<PlatformResult>,
    pub approval_history: Vec<ApprovalEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduledContent {
    /// The status a new item starts in.
    pub fn initial_status(workflow: &WorkflowSettings) -> ContentStatus {
        if workflow.requires_approval {
            ContentStatus::PendingApproval
        } else {
            ContentStatus::Scheduled
        }
    }

    /// Published items are immutable except for appending publish results.
    pub fn is_mutable(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Check that the platform set is a non-empty subset of what the
    /// template (if any) supports.
    pub fn validate_platforms(
        platforms: &[Platform],
        template: Option<&ContentTemplate>,
    ) -> Result<(), EngineError> {
        if platforms.is_empty() {
            return Err(EngineError::Validation(
                "Platform set must not be empty".to_string(),
            ));
        }
        if let Some(template) = template {
            for platform in platforms {
                if !template.supports(*platform) {
                    return Err(EngineError::Validation(format!(
                        "Template '{}' does not support platform {}",
                        template.name, platform
                    )));
                }
            }
        }
        Ok(())
    }

    fn apply(
        &mut self,
        action: WorkflowAction,
        all_succeeded: bool,
        actor: &str,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        self.status = self.status.transition(action, all_succeeded)?;
        self.approval_history
            .push(ApprovalEntry::new(actor, action, note, now));
        self.updated_at = now;
        Ok(())
    }

    /// Approve a pending item, making it eligible for dispatch.
    pub fn approve(
        &mut self,
        actor: &str,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        self.apply(WorkflowAction::Approve, true, actor, comment, now)
    }

    /// Reject a pending item. The reason is mandatory.
    pub fn reject(
        &mut self,
        actor: &str,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        if reason.trim().is_empty() {
            return Err(EngineError::Validation(
                "Rejection requires a reason".to_string(),
            ));
        }
        self.apply(WorkflowAction::Reject, true, actor, Some(reason), now)
    }

    /// Send a pending item back for changes. The feedback is mandatory.
    pub fn request_revision(
        &mut self,
        actor: &str,
        feedback: String,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        if feedback.trim().is_empty() {
            return Err(EngineError::Validation(
                "Revision requests require feedback".to_string(),
            ));
        }
        self.apply(
            WorkflowAction::RequestRevision,
            true,
            actor,
            Some(feedback),
            now,
        )
    }

    /// Resubmit a draft or rejected item for review.
    ///
    /// Revision-requested items cannot resubmit directly: an edit moves
    /// them back to `draft` first.
    pub fn resubmit(&mut self, actor: &str, now: DateTime<Utc>) -> Result<(), EngineError> {
        self.apply(WorkflowAction::Resubmit, true, actor, None, now)
    }

    /// Record aggregated per-platform results, landing on `published`
    /// when every platform succeeded and `failed` otherwise.
    pub fn mark_published(
        &mut self,
        results: Vec<PlatformResult>,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        let succeeded = results.iter().filter(|r| r.success).count();
        let all_succeeded = succeeded == results.len() && !results.is_empty();
        let note = format!("{}/{} platforms succeeded", succeeded, results.len());
        self.apply(
            WorkflowAction::MarkPublished,
            all_succeeded,
            SYSTEM_ACTOR,
            Some(note),
            now,
        )?;
        self.publish_results = results;
        Ok(())
    }

    /// Re-queue a failed item for another dispatch attempt. Publish
    /// results and history are preserved.
    pub fn retry_publish(&mut self, actor: &str, now: DateTime<Utc>) -> Result<(), EngineError> {
        self.apply(WorkflowAction::RetryPublish, true, actor, None, now)
    }
}

/// Filters for listing content.
#[derive(Debug, Clone, Default)]
pub struct ContentFilters {
    pub statuses: Vec<ContentStatus>,
    pub platforms: Vec<Platform>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Request payload for creating scheduled content.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateContentRequest {
    pub template_id: Option<Uuid>,

    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 10000, message = "Body must be 1-10000 characters"))]
    pub body: String,

    #[serde(default)]
    pub media_urls: Vec<String>,

    #[validate(length(min = 1, message = "Platform set must not be empty"))]
    pub platforms: Vec<Platform>,

    pub schedule: Schedule,

    pub workflow: WorkflowSettings,

    #[serde(default)]
    pub ai_generated: bool,

    pub ai_provider: Option<String>,

    #[validate(length(min = 1, max = 200, message = "created_by must be 1-200 characters"))]
    pub created_by: String,
}

/// Request payload for updating scheduled content (partial update).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateContentRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 10000, message = "Body must be 1-10000 characters"))]
    pub body: Option<String>,

    pub media_urls: Option<Vec<String>>,

    #[validate(length(min = 1, message = "Platform set must not be empty"))]
    pub platforms: Option<Vec<Platform>>,

    pub schedule: Option<Schedule>,

    pub workflow: Option<WorkflowSettings>,
}

impl UpdateContentRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.body.is_none()
            && self.media_urls.is_none()
            && self.platforms.is_none()
            && self.schedule.is_none()
            && self.workflow.is_none()
    }
}

/// Request payload for the quick-schedule convenience path.
///
/// Builds a `once` schedule; `auto_post` skips the approval step.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct QuickCreateRequest {
    #[validate(length(min = 1, max = 10000, message = "Body must be 1-10000 characters"))]
    pub body: String,

    #[serde(default)]
    pub media_urls: Vec<String>,

    #[validate(length(min = 1, message = "Platform set must not be empty"))]
    pub platforms: Vec<Platform>,

    pub date: NaiveDate,

    /// Local clock time in 24-hour HH:MM format.
    #[validate(custom(function = "shared::validation::validate_time_of_day"))]
    pub time: String,

    #[validate(custom(function = "shared::validation::validate_timezone"))]
    pub timezone: String,

    #[serde(default)]
    pub auto_post: bool,

    /// Reviewers; required unless `auto_post` is set.
    #[serde(default)]
    pub approvers: Vec<String>,

    #[validate(length(min = 1, max = 200, message = "created_by must be 1-200 characters"))]
    pub created_by: String,
}

/// Body for the approve action.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ApproveRequest {
    #[validate(length(min = 1, max = 200, message = "Actor must be 1-200 characters"))]
    pub actor: String,
    pub comment: Option<String>,
}

/// Body for the reject action.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RejectRequest {
    #[validate(length(min = 1, max = 200, message = "Actor must be 1-200 characters"))]
    pub actor: String,
    #[validate(length(min = 1, max = 2000, message = "Reason must be 1-2000 characters"))]
    pub reason: String,
}

/// Body for the request-revision action.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RequestRevisionRequest {
    #[validate(length(min = 1, max = 200, message = "Actor must be 1-200 characters"))]
    pub actor: String,
    #[validate(length(min = 1, max = 2000, message = "Feedback must be 1-2000 characters"))]
    pub feedback: String,
}

/// Body for the resubmit and retry actions.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ActorRequest {
    #[validate(length(min = 1, max = 200, message = "Actor must be 1-200 characters"))]
    pub actor: String,
}

/// Response payload for content operations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ContentResponse {
    pub id: Uuid,
    pub location_id: Uuid,
    pub template_id: Option<Uuid>,
    pub title: Option<String>,
    pub body: String,
    pub media_urls: Vec<String>,
    pub platforms: Vec<Platform>,
    pub schedule: Schedule,
    pub workflow: WorkflowSettings,
    pub status: ContentStatus,
    pub ai_generated: bool,
    pub ai_provider: Option<String>,
    pub created_by: String,
    pub publish_results: Vec<PlatformResult>,
    pub approval_history: Vec<ApprovalEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ScheduledContent> for ContentResponse {
    fn from(c: ScheduledContent) -> Self {
        Self {
            id: c.id,
            location_id: c.location_id,
            template_id: c.template_id,
            title: c.title,
            body: c.body,
            media_urls: c.media_urls,
            platforms: c.platforms,
            schedule: c.schedule,
            workflow: c.workflow,
            status: c.status,
            ai_generated: c.ai_generated,
            ai_provider: c.ai_provider,
            created_by: c.created_by,
            publish_results: c.publish_results,
            approval_history: c.approval_history,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Response for listing content.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListContentResponse {
    pub content: Vec<ContentResponse>,
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schedule::ScheduleKind;
    use crate::models::template::{ContentType, FieldType, TemplateField};
    use fake::faker::name::en::Name;
    use fake::Fake;

    fn sample_content(status: ContentStatus) -> ScheduledContent {
        let now = Utc::now();
        ScheduledContent {
            id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            template_id: None,
            title: Some("Spring sale".to_string()),
            body: "The spring sale starts Monday.".to_string(),
            media_urls: vec![],
            platforms: vec![Platform::Facebook, Platform::Instagram],
            schedule: Schedule {
                kind: ScheduleKind::Once,
                start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                time: "09:00".to_string(),
                timezone: "UTC".to_string(),
                days_of_week: None,
                day_of_month: None,
                end_date: None,
            },
            workflow: WorkflowSettings::auto_publish(),
            status,
            ai_generated: false,
            ai_provider: None,
            created_by: Name().fake(),
            publish_results: vec![],
            approval_history: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_initial_status_follows_workflow() {
        let approval = WorkflowSettings {
            requires_approval: true,
            approvers: vec!["lead@agency.test".to_string()],
            notify_via_telegram: false,
            telegram_chat_id: None,
        };
        assert_eq!(
            ScheduledContent::initial_status(&approval),
            ContentStatus::PendingApproval
        );
        assert_eq!(
            ScheduledContent::initial_status(&WorkflowSettings::auto_publish()),
            ContentStatus::Scheduled
        );
    }

    #[test]
    fn test_approve_appends_history() {
        let mut content = sample_content(ContentStatus::PendingApproval);
        content
            .approve("lead@agency.test", Some("Looks good".to_string()), Utc::now())
            .unwrap();
        assert_eq!(content.status, ContentStatus::Scheduled);
        assert_eq!(content.approval_history.len(), 1);
        assert_eq!(content.approval_history[0].actor, "lead@agency.test");
        assert_eq!(
            content.approval_history[0].action,
            WorkflowAction::Approve
        );
    }

    #[test]
    fn test_approve_fails_outside_pending_approval() {
        for status in ContentStatus::ALL {
            if status == ContentStatus::PendingApproval {
                continue;
            }
            let mut content = sample_content(status);
            let result = content.approve("lead@agency.test", None, Utc::now());
            assert!(result.is_err(), "approve must fail from {}", status);
            assert_eq!(content.status, status, "status must not change on failure");
            assert!(content.approval_history.is_empty());
        }
    }

    #[test]
    fn test_reject_requires_reason() {
        let mut content = sample_content(ContentStatus::PendingApproval);
        assert!(content
            .reject("lead@agency.test", "  ".to_string(), Utc::now())
            .is_err());
        assert_eq!(content.status, ContentStatus::PendingApproval);

        content
            .reject("lead@agency.test", "Wrong audience".to_string(), Utc::now())
            .unwrap();
        assert_eq!(content.status, ContentStatus::Rejected);
        assert_eq!(
            content.approval_history[0].note.as_deref(),
            Some("Wrong audience")
        );
    }

    #[test]
    fn test_request_revision_requires_feedback() {
        let mut content = sample_content(ContentStatus::PendingApproval);
        assert!(content
            .request_revision("lead@agency.test", String::new(), Utc::now())
            .is_err());

        content
            .request_revision("lead@agency.test", "Shorten the copy".to_string(), Utc::now())
            .unwrap();
        assert_eq!(content.status, ContentStatus::RevisionRequested);
    }

    #[test]
    fn test_resubmit_from_draft_and_rejected() {
        for status in [ContentStatus::Draft, ContentStatus::Rejected] {
            let mut content = sample_content(status);
            content.resubmit("author@agency.test", Utc::now()).unwrap();
            assert_eq!(content.status, ContentStatus::PendingApproval);
        }

        let mut content = sample_content(ContentStatus::RevisionRequested);
        assert!(content.resubmit("author@agency.test", Utc::now()).is_err());
    }

    #[test]
    fn test_mark_published_all_succeeded() {
        let mut content = sample_content(ContentStatus::Scheduled);
        let now = Utc::now();
        let results = vec![
            PlatformResult::ok(Platform::Facebook, "fb-1", now),
            PlatformResult::ok(Platform::Instagram, "ig-1", now),
        ];
        content.mark_published(results, now).unwrap();
        assert_eq!(content.status, ContentStatus::Published);
        assert_eq!(content.publish_results.len(), 2);
        assert_eq!(
            content.approval_history[0].note.as_deref(),
            Some("2/2 platforms succeeded")
        );
    }

    #[test]
    fn test_mark_published_partial_failure_lands_on_failed() {
        let mut content = sample_content(ContentStatus::Scheduled);
        let now = Utc::now();
        let results = vec![
            PlatformResult::ok(Platform::Facebook, "fb-1", now),
            PlatformResult::failed(Platform::Instagram, "token expired", now),
        ];
        content.mark_published(results, now).unwrap();
        assert_eq!(content.status, ContentStatus::Failed);
        let successes = content.publish_results.iter().filter(|r| r.success).count();
        assert_eq!(successes, 1);
    }

    #[test]
    fn test_retry_publish_preserves_results_and_history() {
        let mut content = sample_content(ContentStatus::Scheduled);
        let now = Utc::now();
        content
            .mark_published(
                vec![PlatformResult::failed(Platform::Facebook, "timeout", now)],
                now,
            )
            .unwrap();
        assert_eq!(content.status, ContentStatus::Failed);

        content.retry_publish("author@agency.test", now).unwrap();
        assert_eq!(content.status, ContentStatus::Scheduled);
        assert_eq!(content.publish_results.len(), 1);
        assert_eq!(content.approval_history.len(), 2);
    }

    #[test]
    fn test_published_is_immutable() {
        let mut content = sample_content(ContentStatus::Published);
        assert!(!content.is_mutable());
        assert!(content.retry_publish("anyone", Utc::now()).is_err());
        assert!(content.resubmit("anyone", Utc::now()).is_err());
    }

    #[test]
    fn test_validate_platforms_against_template() {
        let template = ContentTemplate {
            id: Uuid::new_v4(),
            location_id: None,
            name: "Promo".to_string(),
            description: None,
            content_type: ContentType::SocialPost,
            platforms: vec![Platform::Facebook],
            fields: vec![TemplateField {
                name: "body".to_string(),
                label: "Body".to_string(),
                field_type: FieldType::LongText,
                required: true,
            }],
            defaults: serde_json::json!({}),
            is_system_template: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(ScheduledContent::validate_platforms(&[], None).is_err());
        assert!(
            ScheduledContent::validate_platforms(&[Platform::Facebook], Some(&template)).is_ok()
        );
        assert!(ScheduledContent::validate_platforms(
            &[Platform::Facebook, Platform::Tiktok],
            Some(&template)
        )
        .is_err());
        // No template: any non-empty set is fine.
        assert!(ScheduledContent::validate_platforms(&[Platform::Tiktok], None).is_ok());
    }

    #[test]
    fn test_quick_create_request_validates_time_and_timezone() {
        let mut request = QuickCreateRequest {
            body: "Starts Monday.".to_string(),
            media_urls: vec![],
            platforms: vec![Platform::Facebook],
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            time: "09:00".to_string(),
            timezone: "Europe/Bratislava".to_string(),
            auto_post: true,
            approvers: vec![],
            created_by: "author@agency.test".to_string(),
        };
        assert!(request.validate().is_ok());

        request.time = "9:00".to_string();
        assert!(request.validate().is_err());

        request.time = "09:00".to_string();
        request.timezone = "Mars/Olympus_Mons".to_string();
        assert!(request.validate().is_err());
    }
}
