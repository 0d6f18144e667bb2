//! Template endpoint handlers.
//!
//! CRUD for reusable content templates, scoped to one tenant. System
//! templates are visible to every tenant but immutable.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::template::{
    ContentTemplate, CreateTemplateRequest, ListTemplatesResponse, TemplateResponse,
    UpdateTemplateRequest,
};

use crate::app::AppState;
use crate::error::ApiError;
use persistence::repositories::TemplateRepository;

/// Create a new template for a tenant.
///
/// POST /api/v1/locations/:location_id/templates
pub async fn create_template(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
    Json(request): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<TemplateResponse>), ApiError> {
    request.validate()?;

    let now = Utc::now();
    let template = ContentTemplate {
        id: Uuid::new_v4(),
        location_id: Some(location_id),
        name: request.name,
        description: request.description,
        content_type: request.content_type,
        platforms: request.platforms,
        fields: request.fields,
        defaults: request.defaults,
        is_system_template: false,
        created_at: now,
        updated_at: now,
    };

    let repo = TemplateRepository::new(state.pool.clone());
    let created = repo.create(&template).await?;

    info!(
        template_id = %created.id,
        location_id = %location_id,
        name = %created.name,
        "Template created"
    );

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List templates visible to a tenant (own plus system).
///
/// GET /api/v1/locations/:location_id/templates
pub async fn list_templates(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
) -> Result<Json<ListTemplatesResponse>, ApiError> {
    let repo = TemplateRepository::new(state.pool.clone());
    let templates = repo.list_for_location(location_id).await?;
    let total = templates.len() as i64;

    Ok(Json(ListTemplatesResponse {
        templates: templates.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// Get a single template.
///
/// GET /api/v1/locations/:location_id/templates/:template_id
pub async fn get_template(
    State(state): State<AppState>,
    Path((location_id, template_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<TemplateResponse>, ApiError> {
    let repo = TemplateRepository::new(state.pool.clone());
    let template = repo
        .find_by_id(location_id, template_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Template not found".to_string()))?;

    Ok(Json(template.into()))
}

/// Update a tenant-owned template (partial update).
///
/// PUT /api/v1/locations/:location_id/templates/:template_id
pub async fn update_template(
    State(state): State<AppState>,
    Path((location_id, template_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateTemplateRequest>,
) -> Result<Json<TemplateResponse>, ApiError> {
    request.validate()?;

    let repo = TemplateRepository::new(state.pool.clone());
    let existing = repo
        .find_by_id(location_id, template_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Template not found".to_string()))?;

    if existing.is_system_template {
        return Err(ApiError::Conflict(
            "System templates cannot be modified".to_string(),
        ));
    }

    let platforms = request
        .platforms
        .map(|p| serde_json::to_value(p))
        .transpose()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let fields = request
        .fields
        .map(|f| serde_json::to_value(f))
        .transpose()
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let updated = repo
        .update(
            location_id,
            template_id,
            request.name.as_deref(),
            request.description.as_deref(),
            request.content_type.map(|c| c.to_string()),
            platforms,
            fields,
            request.defaults,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Template not found".to_string()))?;

    info!(
        template_id = %template_id,
        location_id = %location_id,
        "Template updated"
    );

    Ok(Json(updated.into()))
}

/// Delete a tenant-owned template.
///
/// DELETE /api/v1/locations/:location_id/templates/:template_id
///
/// Content keeps a weak reference to its template, so existing items
/// survive the deletion.
pub async fn delete_template(
    State(state): State<AppState>,
    Path((location_id, template_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let repo = TemplateRepository::new(state.pool.clone());
    let existing = repo
        .find_by_id(location_id, template_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Template not found".to_string()))?;

    if existing.is_system_template {
        return Err(ApiError::Conflict(
            "System templates cannot be deleted".to_string(),
        ));
    }

    let deleted = repo.delete(location_id, template_id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Template not found".to_string()));
    }

    info!(
        template_id = %template_id,
        location_id = %location_id,
        "Template deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}
