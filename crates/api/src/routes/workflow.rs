//! Workflow action handlers.
//!
//! Approve, reject, request-revision, resubmit, and publish. Every
//! transition is committed with a compare-and-set on the status the
//! caller saw, so concurrent reviewers get a conflict instead of a
//! silent overwrite.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::content::{
    ActorRequest, ApproveRequest, ContentResponse, RejectRequest, RequestRevisionRequest,
};
use domain::models::{ContentStatus, ScheduledContent};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_status_conflict, record_workflow_transition};
use crate::routes::content::notify_approval_requested;
use crate::services::PublishDispatcher;
use persistence::repositories::ContentRepository;

async fn load_content(
    repo: &ContentRepository,
    location_id: Uuid,
    content_id: Uuid,
) -> Result<ScheduledContent, ApiError> {
    repo.find_by_id(location_id, content_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Content not found".to_string()))
}

/// Commit a transition guarded on the status the item had when loaded.
async fn commit_transition(
    repo: &ContentRepository,
    content: &ScheduledContent,
    expected: ContentStatus,
    action: &str,
) -> Result<(), ApiError> {
    let rows = repo.commit_status(content, expected).await?;
    if rows == 0 {
        record_status_conflict();
        return Err(ApiError::Conflict(
            "Content status changed concurrently".to_string(),
        ));
    }

    record_workflow_transition(action);
    info!(
        content_id = %content.id,
        location_id = %content.location_id,
        action = action,
        status = %content.status,
        "Workflow transition committed"
    );
    Ok(())
}

/// Approve pending content; it moves straight to `scheduled`.
///
/// POST /api/v1/locations/:location_id/content/:content_id/approve
pub async fn approve(
    State(state): State<AppState>,
    Path((location_id, content_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<ApproveRequest>,
) -> Result<Json<ContentResponse>, ApiError> {
    request.validate()?;

    let repo = ContentRepository::new(state.pool.clone());
    let mut content = load_content(&repo, location_id, content_id).await?;
    let expected = content.status;

    content.approve(&request.actor, request.comment, Utc::now())?;
    commit_transition(&repo, &content, expected, "approve").await?;

    Ok(Json(content.into()))
}

/// Reject pending content. A reason is required.
///
/// POST /api/v1/locations/:location_id/content/:content_id/reject
pub async fn reject(
    State(state): State<AppState>,
    Path((location_id, content_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<RejectRequest>,
) -> Result<Json<ContentResponse>, ApiError> {
    request.validate()?;

    let repo = ContentRepository::new(state.pool.clone());
    let mut content = load_content(&repo, location_id, content_id).await?;
    let expected = content.status;

    content.reject(&request.actor, request.reason, Utc::now())?;
    commit_transition(&repo, &content, expected, "reject").await?;

    Ok(Json(content.into()))
}

/// Send pending content back to its author with feedback.
///
/// POST /api/v1/locations/:location_id/content/:content_id/request-revision
pub async fn request_revision(
    State(state): State<AppState>,
    Path((location_id, content_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<RequestRevisionRequest>,
) -> Result<Json<ContentResponse>, ApiError> {
    request.validate()?;

    let repo = ContentRepository::new(state.pool.clone());
    let mut content = load_content(&repo, location_id, content_id).await?;
    let expected = content.status;

    content.request_revision(&request.actor, request.feedback, Utc::now())?;
    commit_transition(&repo, &content, expected, "request_revision").await?;

    Ok(Json(content.into()))
}

/// Resubmit draft or rejected content for approval.
///
/// POST /api/v1/locations/:location_id/content/:content_id/resubmit
pub async fn resubmit(
    State(state): State<AppState>,
    Path((location_id, content_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<ActorRequest>,
) -> Result<Json<ContentResponse>, ApiError> {
    request.validate()?;

    let repo = ContentRepository::new(state.pool.clone());
    let mut content = load_content(&repo, location_id, content_id).await?;
    let expected = content.status;

    content.resubmit(&request.actor, Utc::now())?;
    commit_transition(&repo, &content, expected, "resubmit").await?;

    notify_approval_requested(&state.notifier, &content).await;

    Ok(Json(content.into()))
}

/// Publish now.
///
/// POST /api/v1/locations/:location_id/content/:content_id/publish
///
/// For `scheduled` items this dispatches immediately. For `failed`
/// items it first moves the item back to `scheduled` and then retries
/// only the platforms that have not succeeded yet.
pub async fn publish(
    State(state): State<AppState>,
    Path((location_id, content_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<ActorRequest>,
) -> Result<Json<ContentResponse>, ApiError> {
    request.validate()?;

    let repo = ContentRepository::new(state.pool.clone());
    let mut content = load_content(&repo, location_id, content_id).await?;

    if content.status == ContentStatus::Failed {
        let expected = content.status;
        content.retry_publish(&request.actor, Utc::now())?;
        commit_transition(&repo, &content, expected, "retry_publish").await?;
    }

    let dispatcher = PublishDispatcher::new(
        repo,
        state.publisher.clone(),
        state.notifier.clone(),
    );
    let published = dispatcher.dispatch(content).await?;

    Ok(Json(published.into()))
}
