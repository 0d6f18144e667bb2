//! Template repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use domain::models::ContentTemplate;

use crate::entities::ContentTemplateEntity;
use crate::metrics::QueryTimer;
use crate::repositories::{into_model, to_jsonb};

/// Repository for content-template database operations.
///
/// Reads are tenant scoped and always include system templates
/// (`location_id IS NULL`); writes never touch system templates.
#[derive(Clone)]
pub struct TemplateRepository {
    pool: PgPool,
}

impl TemplateRepository {
    /// Creates a new TemplateRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new template.
    pub async fn create(&self, template: &ContentTemplate) -> Result<ContentTemplate, sqlx::Error> {
        let timer = QueryTimer::new("create_template");
        let result = sqlx::query_as::<_, ContentTemplateEntity>(
            r#"
            INSERT INTO content_templates
                (id, location_id, name, description, content_type, platforms,
                 fields, defaults, is_system_template)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(template.id)
        .bind(template.location_id)
        .bind(&template.name)
        .bind(&template.description)
        .bind(template.content_type.to_string())
        .bind(to_jsonb(&template.platforms)?)
        .bind(to_jsonb(&template.fields)?)
        .bind(&template.defaults)
        .bind(template.is_system_template)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result.and_then(into_model)
    }

    /// Find a template visible to the tenant: their own or a system one.
    pub async fn find_by_id(
        &self,
        location_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ContentTemplate>, sqlx::Error> {
        let timer = QueryTimer::new("find_template_by_id");
        let result = sqlx::query_as::<_, ContentTemplateEntity>(
            r#"
            SELECT * FROM content_templates
            WHERE id = $1 AND (location_id = $2 OR location_id IS NULL)
            "#,
        )
        .bind(id)
        .bind(location_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result?.map(into_model).transpose()
    }

    /// List templates visible to the tenant, newest first.
    pub async fn list_for_location(
        &self,
        location_id: Uuid,
    ) -> Result<Vec<ContentTemplate>, sqlx::Error> {
        let timer = QueryTimer::new("list_templates_for_location");
        let result = sqlx::query_as::<_, ContentTemplateEntity>(
            r#"
            SELECT * FROM content_templates
            WHERE location_id = $1 OR location_id IS NULL
            ORDER BY created_at DESC
            "#,
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result?.into_iter().map(into_model).collect()
    }

    /// Update a tenant-owned template (partial update).
    /// Only provided fields are updated; None values are preserved.
    /// System templates are never matched.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        location_id: Uuid,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        content_type: Option<String>,
        platforms: Option<serde_json::Value>,
        fields: Option<serde_json::Value>,
        defaults: Option<serde_json::Value>,
    ) -> Result<Option<ContentTemplate>, sqlx::Error> {
        let timer = QueryTimer::new("update_template");
        let result = sqlx::query_as::<_, ContentTemplateEntity>(
            r#"
            UPDATE content_templates SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                content_type = COALESCE($5, content_type),
                platforms = COALESCE($6, platforms),
                fields = COALESCE($7, fields),
                defaults = COALESCE($8, defaults),
                updated_at = NOW()
            WHERE id = $1 AND location_id = $2 AND is_system_template = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(location_id)
        .bind(name)
        .bind(description)
        .bind(content_type)
        .bind(platforms)
        .bind(fields)
        .bind(defaults)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result?.map(into_model).transpose()
    }

    /// Delete a tenant-owned template.
    /// Returns the number of rows deleted (0 or 1).
    pub async fn delete(&self, location_id: Uuid, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_template");
        let result = sqlx::query(
            r#"
            DELETE FROM content_templates
            WHERE id = $1 AND location_id = $2 AND is_system_template = FALSE
            "#,
        )
        .bind(id)
        .bind(location_id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Find a system template by name (seed idempotency check).
    pub async fn find_system_by_name(
        &self,
        name: &str,
    ) -> Result<Option<ContentTemplate>, sqlx::Error> {
        let timer = QueryTimer::new("find_system_template_by_name");
        let result = sqlx::query_as::<_, ContentTemplateEntity>(
            r#"
            SELECT * FROM content_templates
            WHERE name = $1 AND is_system_template = TRUE AND location_id IS NULL
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result?.map(into_model).transpose()
    }
}
