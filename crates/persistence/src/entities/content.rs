//! Scheduled content entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{ContentStatus, Platform, ScheduledContent};

/// Database row mapping for the scheduled_content table.
///
/// `occurs_at` is denormalized from the schedule for `once` items so the
/// dispatch job can find due work with an index scan; it is NULL for
/// recurring schedules.
#[derive(Debug, Clone, FromRow)]
pub struct ScheduledContentEntity {
    pub id: Uuid,
    pub location_id: Uuid,
    pub template_id: Option<Uuid>,
    pub title: Option<String>,
    pub body: String,
    /// JSONB array of URLs.
    pub media_urls: serde_json::Value,
    /// JSONB array of platform names.
    pub platforms: serde_json::Value,
    /// JSONB schedule descriptor.
    pub schedule: serde_json::Value,
    /// JSONB workflow descriptor.
    pub workflow: serde_json::Value,
    pub status: String,
    pub ai_generated: bool,
    pub ai_provider: Option<String>,
    pub created_by: String,
    /// JSONB array of per-platform publish results.
    pub publish_results: serde_json::Value,
    /// JSONB array of approval history entries.
    pub approval_history: serde_json::Value,
    pub occurs_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ScheduledContentEntity> for ScheduledContent {
    type Error = serde_json::Error;

    fn try_from(entity: ScheduledContentEntity) -> Result<Self, Self::Error> {
        let status: ContentStatus =
            serde_json::from_value(serde_json::Value::String(entity.status))?;
        let media_urls: Vec<String> = serde_json::from_value(entity.media_urls)?;
        let platforms: Vec<Platform> = serde_json::from_value(entity.platforms)?;
        let schedule = serde_json::from_value(entity.schedule)?;
        let workflow = serde_json::from_value(entity.workflow)?;
        let publish_results = serde_json::from_value(entity.publish_results)?;
        let approval_history = serde_json::from_value(entity.approval_history)?;
        Ok(ScheduledContent {
            id: entity.id,
            location_id: entity.location_id,
            template_id: entity.template_id,
            title: entity.title,
            body: entity.body,
            media_urls,
            platforms,
            schedule,
            workflow,
            status,
            ai_generated: entity.ai_generated,
            ai_provider: entity.ai_provider,
            created_by: entity.created_by,
            publish_results,
            approval_history,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}
