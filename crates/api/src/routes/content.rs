//! Scheduled content endpoint handlers.
//!
//! CRUD plus the calendar and review queue projections. Workflow actions
//! live in `routes::workflow`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use domain::models::content::{
    ContentResponse, CreateContentRequest, ListContentResponse, QuickCreateRequest,
    UpdateContentRequest,
};
use domain::models::{
    ContentFilters, ContentStatus, ContentTemplate, Platform, Schedule, ScheduleKind,
    ScheduledContent, WorkflowSettings,
};
use domain::services::{
    build_calendar, ApprovalRequestedPayload, CalendarView, NotificationResult,
    NotificationService, NotificationType,
};
use shared::pagination::{decode_cursor, encode_cursor};
use shared::validation::validate_media_url;

use crate::app::AppState;
use crate::error::ApiError;
use persistence::repositories::{ContentRepository, TemplateRepository};

/// Query parameters for listing content.
#[derive(Debug, Deserialize)]
pub struct ListContentQuery {
    /// Comma-separated status filter.
    pub status: Option<String>,
    /// Comma-separated platform filter.
    pub platform: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

/// Query parameters for the calendar view.
#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: i32,
    pub month: u32,
}

fn parse_csv<T: std::str::FromStr>(raw: &Option<String>, what: &str) -> Result<Vec<T>, ApiError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<T>()
                .map_err(|_| ApiError::Validation(format!("Unknown {}: {}", what, s)))
        })
        .collect()
}

fn check_media_urls(urls: &[String]) -> Result<(), ApiError> {
    for url in urls {
        validate_media_url(url).map_err(|_| {
            ApiError::Validation(format!("Media URL must be http(s): {}", url))
        })?;
    }
    Ok(())
}

/// Ensure a one-shot schedule resolves to a future instant.
fn check_once_in_future(schedule: &Schedule) -> Result<(), ApiError> {
    if schedule.kind != ScheduleKind::Once {
        return Ok(());
    }
    match schedule.once_instant() {
        Some(instant) if instant > Utc::now() => Ok(()),
        Some(_) => Err(ApiError::Validation(
            "One-time schedules must be in the future".to_string(),
        )),
        None => Err(ApiError::Validation(
            "Schedule resolves to a non-existent local time".to_string(),
        )),
    }
}

/// Resolve and check the template, treating a dangling reference as
/// "no template".
async fn resolve_template(
    repo: &TemplateRepository,
    location_id: Uuid,
    template_id: Option<Uuid>,
) -> Result<Option<ContentTemplate>, ApiError> {
    match template_id {
        Some(id) => Ok(repo.find_by_id(location_id, id).await?),
        None => Ok(None),
    }
}

/// Best-effort review notification; logged and swallowed on error.
pub(crate) async fn notify_approval_requested(
    notifier: &Arc<dyn NotificationService>,
    content: &ScheduledContent,
) {
    if !content.workflow.notify_via_telegram {
        return;
    }
    let Some(chat_id) = content.workflow.telegram_chat_id.as_deref() else {
        return;
    };

    let payload = ApprovalRequestedPayload {
        notification_type: NotificationType::ApprovalRequested,
        content_id: content.id,
        location_id: content.location_id,
        title: content.title.clone(),
        approvers: content.workflow.approvers.clone(),
        requested_by: content.created_by.clone(),
        timestamp: Utc::now(),
    };

    if let NotificationResult::Failed(reason) = notifier
        .send_approval_requested(chat_id, payload)
        .await
    {
        warn!(
            content_id = %content.id,
            reason = %reason,
            "Approval-request notification could not be sent"
        );
    }
}

/// Create scheduled content.
///
/// POST /api/v1/locations/:location_id/content
pub async fn create_content(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
    Json(request): Json<CreateContentRequest>,
) -> Result<(StatusCode, Json<ContentResponse>), ApiError> {
    request.validate()?;
    request.schedule.validate()?;
    request.workflow.validate()?;
    check_media_urls(&request.media_urls)?;
    check_once_in_future(&request.schedule)?;

    let template_repo = TemplateRepository::new(state.pool.clone());
    let template = resolve_template(&template_repo, location_id, request.template_id).await?;
    ScheduledContent::validate_platforms(&request.platforms, template.as_ref())?;

    let now = Utc::now();
    let status = ScheduledContent::initial_status(&request.workflow);
    let occurs_at = request.schedule.once_instant();
    let content = ScheduledContent {
        id: Uuid::new_v4(),
        location_id,
        template_id: template.as_ref().map(|t| t.id),
        title: request.title,
        body: request.body,
        media_urls: request.media_urls,
        platforms: request.platforms,
        schedule: request.schedule,
        workflow: request.workflow,
        status,
        ai_generated: request.ai_generated,
        ai_provider: request.ai_provider,
        created_by: request.created_by,
        publish_results: Vec::new(),
        approval_history: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    let repo = ContentRepository::new(state.pool.clone());
    let created = repo.create(&content, occurs_at).await?;

    info!(
        content_id = %created.id,
        location_id = %location_id,
        status = %created.status,
        "Content created"
    );

    if created.status == ContentStatus::PendingApproval {
        notify_approval_requested(&state.notifier, &created).await;
    }

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Quick-schedule a one-time post.
///
/// POST /api/v1/locations/:location_id/content/quick
pub async fn quick_create(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
    Json(request): Json<QuickCreateRequest>,
) -> Result<(StatusCode, Json<ContentResponse>), ApiError> {
    request.validate()?;
    check_media_urls(&request.media_urls)?;

    let schedule = Schedule {
        kind: ScheduleKind::Once,
        start_date: request.date,
        time: request.time,
        timezone: request.timezone,
        days_of_week: None,
        day_of_month: None,
        end_date: None,
    };
    schedule.validate()?;
    check_once_in_future(&schedule)?;

    let workflow = if request.auto_post {
        WorkflowSettings::auto_publish()
    } else {
        WorkflowSettings {
            requires_approval: true,
            approvers: request.approvers,
            notify_via_telegram: false,
            telegram_chat_id: None,
        }
    };
    workflow.validate()?;

    let now = Utc::now();
    let status = ScheduledContent::initial_status(&workflow);
    let occurs_at = schedule.once_instant();
    let content = ScheduledContent {
        id: Uuid::new_v4(),
        location_id,
        template_id: None,
        title: None,
        body: request.body,
        media_urls: request.media_urls,
        platforms: request.platforms,
        schedule,
        workflow,
        status,
        ai_generated: false,
        ai_provider: None,
        created_by: request.created_by,
        publish_results: Vec::new(),
        approval_history: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    let repo = ContentRepository::new(state.pool.clone());
    let created = repo.create(&content, occurs_at).await?;

    info!(
        content_id = %created.id,
        location_id = %location_id,
        status = %created.status,
        "Content quick-created"
    );

    if created.status == ContentStatus::PendingApproval {
        notify_approval_requested(&state.notifier, &created).await;
    }

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List content for a tenant, newest first, with cursor pagination.
///
/// GET /api/v1/locations/:location_id/content
pub async fn list_content(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
    Query(query): Query<ListContentQuery>,
) -> Result<Json<ListContentResponse>, ApiError> {
    let statuses: Vec<ContentStatus> = parse_csv(&query.status, "status")?;
    let platforms: Vec<Platform> = parse_csv(&query.platform, "platform")?;
    let filters = ContentFilters {
        statuses,
        platforms,
        from: query.from,
        to: query.to,
    };

    let limit = query
        .limit
        .unwrap_or(state.config.limits.default_page_size)
        .clamp(1, state.config.limits.max_page_size);
    let cursor = query
        .cursor
        .as_deref()
        .map(decode_cursor)
        .transpose()
        .map_err(|e| ApiError::Validation(format!("Invalid cursor: {}", e)))?;

    let repo = ContentRepository::new(state.pool.clone());
    let items = repo.list(location_id, &filters, limit, cursor).await?;
    let total = repo.count(location_id, &filters).await?;

    let next_cursor = if items.len() as i64 == limit {
        items.last().map(|c| encode_cursor(c.created_at, c.id))
    } else {
        None
    };

    Ok(Json(ListContentResponse {
        content: items.into_iter().map(Into::into).collect(),
        total,
        next_cursor,
    }))
}

/// Review queue: items awaiting approval, oldest first.
///
/// GET /api/v1/locations/:location_id/content/pending-approvals
pub async fn pending_approvals(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
) -> Result<Json<ListContentResponse>, ApiError> {
    let repo = ContentRepository::new(state.pool.clone());
    let items = repo.pending_approvals(location_id).await?;
    let total = items.len() as i64;

    Ok(Json(ListContentResponse {
        content: items.into_iter().map(Into::into).collect(),
        total,
        next_cursor: None,
    }))
}

/// Month calendar projection.
///
/// GET /api/v1/locations/:location_id/content/calendar?year=2025&month=3
pub async fn calendar_view(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarView>, ApiError> {
    if !(1..=12).contains(&query.month) {
        return Err(ApiError::Validation(format!(
            "Month {} is out of range 1-12",
            query.month
        )));
    }
    let first = NaiveDate::from_ymd_opt(query.year, query.month, 1)
        .ok_or_else(|| ApiError::Validation("Invalid calendar year".to_string()))?;
    let next_month = if query.month == 12 {
        NaiveDate::from_ymd_opt(query.year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(query.year, query.month + 1, 1)
    }
    .ok_or_else(|| ApiError::Validation("Invalid calendar year".to_string()))?;

    let repo = ContentRepository::new(state.pool.clone());
    let items = repo
        .candidates_for_range(location_id, first, next_month)
        .await?;

    Ok(Json(build_calendar(&items, first.year(), query.month)))
}

/// Get a single content item.
///
/// GET /api/v1/locations/:location_id/content/:content_id
pub async fn get_content(
    State(state): State<AppState>,
    Path((location_id, content_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ContentResponse>, ApiError> {
    let repo = ContentRepository::new(state.pool.clone());
    let content = repo
        .find_by_id(location_id, content_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Content not found".to_string()))?;

    Ok(Json(content.into()))
}

/// Update a content item (partial update).
///
/// PUT /api/v1/locations/:location_id/content/:content_id
///
/// Editing a revision-requested item returns it to `draft`.
pub async fn update_content(
    State(state): State<AppState>,
    Path((location_id, content_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateContentRequest>,
) -> Result<Json<ContentResponse>, ApiError> {
    request.validate()?;
    if request.is_empty() {
        return Err(ApiError::Validation("No fields to update".to_string()));
    }

    let repo = ContentRepository::new(state.pool.clone());
    let mut content = repo
        .find_by_id(location_id, content_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Content not found".to_string()))?;

    if !content.is_mutable() {
        return Err(ApiError::Conflict(
            "Published content cannot be modified".to_string(),
        ));
    }

    if let Some(title) = request.title {
        content.title = Some(title);
    }
    if let Some(body) = request.body {
        content.body = body;
    }
    if let Some(media_urls) = request.media_urls {
        check_media_urls(&media_urls)?;
        content.media_urls = media_urls;
    }
    if let Some(platforms) = request.platforms {
        let template_repo = TemplateRepository::new(state.pool.clone());
        let template =
            resolve_template(&template_repo, location_id, content.template_id).await?;
        ScheduledContent::validate_platforms(&platforms, template.as_ref())?;
        content.platforms = platforms;
    }
    if let Some(schedule) = request.schedule {
        schedule.validate()?;
        check_once_in_future(&schedule)?;
        content.schedule = schedule;
    }
    if let Some(workflow) = request.workflow {
        workflow.validate()?;
        content.workflow = workflow;
    }

    if content.status == ContentStatus::RevisionRequested {
        content.status = ContentStatus::Draft;
    }
    content.updated_at = Utc::now();

    let occurs_at = content.schedule.once_instant();
    let updated = repo
        .save(&content, occurs_at)
        .await?
        .ok_or_else(|| ApiError::NotFound("Content not found".to_string()))?;

    info!(
        content_id = %content_id,
        location_id = %location_id,
        status = %updated.status,
        "Content updated"
    );

    Ok(Json(updated.into()))
}

/// Delete a content item. Published items cannot be deleted.
///
/// DELETE /api/v1/locations/:location_id/content/:content_id
pub async fn delete_content(
    State(state): State<AppState>,
    Path((location_id, content_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let repo = ContentRepository::new(state.pool.clone());
    let content = repo
        .find_by_id(location_id, content_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Content not found".to_string()))?;

    if content.status == ContentStatus::Published {
        return Err(ApiError::Conflict(
            "Published content cannot be deleted".to_string(),
        ));
    }

    let deleted = repo.delete(location_id, content_id).await?;
    if deleted == 0 {
        // Raced with a publish; the guard in the delete query held.
        return Err(ApiError::Conflict(
            "Content status changed concurrently".to_string(),
        ));
    }

    info!(
        content_id = %content_id,
        location_id = %location_id,
        "Content deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_statuses() {
        let raw = Some("draft, pending_approval".to_string());
        let statuses: Vec<ContentStatus> = parse_csv(&raw, "status").unwrap();
        assert_eq!(
            statuses,
            vec![ContentStatus::Draft, ContentStatus::PendingApproval]
        );
    }

    #[test]
    fn test_parse_csv_rejects_unknown() {
        let raw = Some("draft,archived".to_string());
        let result: Result<Vec<ContentStatus>, _> = parse_csv(&raw, "status");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_csv_none_is_empty() {
        let statuses: Vec<ContentStatus> = parse_csv(&None, "status").unwrap();
        assert!(statuses.is_empty());
    }

    #[test]
    fn test_check_media_urls() {
        assert!(check_media_urls(&["https://cdn.example.com/a.jpg".to_string()]).is_ok());
        assert!(check_media_urls(&["ftp://cdn.example.com/a.jpg".to_string()]).is_err());
    }

    #[test]
    fn test_check_once_in_future() {
        let mut schedule = Schedule {
            kind: ScheduleKind::Once,
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            time: "09:00".to_string(),
            timezone: "UTC".to_string(),
            days_of_week: None,
            day_of_month: None,
            end_date: None,
        };
        assert!(check_once_in_future(&schedule).is_err());

        schedule.start_date = NaiveDate::from_ymd_opt(2100, 1, 1).unwrap();
        assert!(check_once_in_future(&schedule).is_ok());

        // Recurring schedules may start in the past.
        schedule.kind = ScheduleKind::Daily;
        schedule.start_date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert!(check_once_in_future(&schedule).is_ok());
    }
}
