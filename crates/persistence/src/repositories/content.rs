//! Scheduled content repository for database operations.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::{ContentFilters, ContentStatus, ScheduledContent};

use crate::entities::ScheduledContentEntity;
use crate::metrics::QueryTimer;
use crate::repositories::{into_model, to_jsonb};

/// Cursor position for keyset pagination over (created_at, id).
pub type ListCursor = (DateTime<Utc>, Uuid);

/// Repository for scheduled-content database operations.
///
/// All tenant-facing queries are scoped by `location_id`; only the
/// dispatch job's due-work scan crosses tenants.
#[derive(Clone)]
pub struct ContentRepository {
    pool: PgPool,
}

impl ContentRepository {
    /// Creates a new ContentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new scheduled-content row.
    ///
    /// `occurs_at` is the denormalized fire instant for `once` schedules,
    /// NULL for recurring ones.
    pub async fn create(
        &self,
        content: &ScheduledContent,
        occurs_at: Option<DateTime<Utc>>,
    ) -> Result<ScheduledContent, sqlx::Error> {
        let timer = QueryTimer::new("create_content");
        let result = sqlx::query_as::<_, ScheduledContentEntity>(
            r#"
            INSERT INTO scheduled_content
                (id, location_id, template_id, title, body, media_urls, platforms,
                 schedule, workflow, status, ai_generated, ai_provider, created_by,
                 publish_results, approval_history, occurs_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(content.id)
        .bind(content.location_id)
        .bind(content.template_id)
        .bind(&content.title)
        .bind(&content.body)
        .bind(to_jsonb(&content.media_urls)?)
        .bind(to_jsonb(&content.platforms)?)
        .bind(to_jsonb(&content.schedule)?)
        .bind(to_jsonb(&content.workflow)?)
        .bind(content.status.as_str())
        .bind(content.ai_generated)
        .bind(&content.ai_provider)
        .bind(&content.created_by)
        .bind(to_jsonb(&content.publish_results)?)
        .bind(to_jsonb(&content.approval_history)?)
        .bind(occurs_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result.and_then(into_model)
    }

    /// Find one item within the tenant.
    pub async fn find_by_id(
        &self,
        location_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ScheduledContent>, sqlx::Error> {
        let timer = QueryTimer::new("find_content_by_id");
        let result = sqlx::query_as::<_, ScheduledContentEntity>(
            r#"
            SELECT * FROM scheduled_content
            WHERE id = $1 AND location_id = $2
            "#,
        )
        .bind(id)
        .bind(location_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result?.map(into_model).transpose()
    }

    /// List items for the tenant, newest first, with keyset pagination.
    ///
    /// The date filters match items whose schedule window `[start_date,
    /// end_date)` intersects the requested `[from, to)` range.
    pub async fn list(
        &self,
        location_id: Uuid,
        filters: &ContentFilters,
        limit: i64,
        cursor: Option<ListCursor>,
    ) -> Result<Vec<ScheduledContent>, sqlx::Error> {
        let timer = QueryTimer::new("list_content");
        let statuses: Vec<String> = filters.statuses.iter().map(|s| s.to_string()).collect();
        let platforms: Vec<String> = filters.platforms.iter().map(|p| p.to_string()).collect();
        let (cursor_at, cursor_id) = match cursor {
            Some((at, id)) => (Some(at), Some(id)),
            None => (None, None),
        };
        let result = sqlx::query_as::<_, ScheduledContentEntity>(
            r#"
            SELECT * FROM scheduled_content
            WHERE location_id = $1
              AND (cardinality($2::text[]) = 0 OR status = ANY($2))
              AND (cardinality($3::text[]) = 0 OR platforms ?| $3)
              AND ($4::date IS NULL
                   OR COALESCE((schedule->>'end_date')::date, DATE '9999-12-31') > $4)
              AND ($5::date IS NULL OR (schedule->>'start_date')::date < $5)
              AND ($6::timestamptz IS NULL OR (created_at, id) < ($6, $7))
            ORDER BY created_at DESC, id DESC
            LIMIT $8
            "#,
        )
        .bind(location_id)
        .bind(&statuses)
        .bind(&platforms)
        .bind(filters.from)
        .bind(filters.to)
        .bind(cursor_at)
        .bind(cursor_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result?.into_iter().map(into_model).collect()
    }

    /// Count items matching the list filters.
    pub async fn count(
        &self,
        location_id: Uuid,
        filters: &ContentFilters,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_content");
        let statuses: Vec<String> = filters.statuses.iter().map(|s| s.to_string()).collect();
        let platforms: Vec<String> = filters.platforms.iter().map(|p| p.to_string()).collect();
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM scheduled_content
            WHERE location_id = $1
              AND (cardinality($2::text[]) = 0 OR status = ANY($2))
              AND (cardinality($3::text[]) = 0 OR platforms ?| $3)
              AND ($4::date IS NULL
                   OR COALESCE((schedule->>'end_date')::date, DATE '9999-12-31') > $4)
              AND ($5::date IS NULL OR (schedule->>'start_date')::date < $5)
            "#,
        )
        .bind(location_id)
        .bind(&statuses)
        .bind(&platforms)
        .bind(filters.from)
        .bind(filters.to)
        .fetch_one(&self.pool)
        .await?;
        timer.record();
        Ok(count.0)
    }

    /// Items awaiting review, oldest submission first.
    pub async fn pending_approvals(
        &self,
        location_id: Uuid,
    ) -> Result<Vec<ScheduledContent>, sqlx::Error> {
        let timer = QueryTimer::new("pending_approvals");
        let result = sqlx::query_as::<_, ScheduledContentEntity>(
            r#"
            SELECT * FROM scheduled_content
            WHERE location_id = $1 AND status = 'pending_approval'
            ORDER BY created_at ASC
            "#,
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result?.into_iter().map(into_model).collect()
    }

    /// Candidate items for a calendar month: schedule window intersects
    /// `[from, to)`.
    pub async fn candidates_for_range(
        &self,
        location_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ScheduledContent>, sqlx::Error> {
        let timer = QueryTimer::new("content_candidates_for_range");
        let result = sqlx::query_as::<_, ScheduledContentEntity>(
            r#"
            SELECT * FROM scheduled_content
            WHERE location_id = $1
              AND (schedule->>'start_date')::date < $3
              AND COALESCE((schedule->>'end_date')::date, DATE '9999-12-31') > $2
            "#,
        )
        .bind(location_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result?.into_iter().map(into_model).collect()
    }

    /// Persist an edited item (full document update of mutable fields).
    pub async fn save(
        &self,
        content: &ScheduledContent,
        occurs_at: Option<DateTime<Utc>>,
    ) -> Result<Option<ScheduledContent>, sqlx::Error> {
        let timer = QueryTimer::new("save_content");
        let result = sqlx::query_as::<_, ScheduledContentEntity>(
            r#"
            UPDATE scheduled_content SET
                title = $3,
                body = $4,
                media_urls = $5,
                platforms = $6,
                schedule = $7,
                workflow = $8,
                status = $9,
                publish_results = $10,
                approval_history = $11,
                occurs_at = $12,
                updated_at = NOW()
            WHERE id = $1 AND location_id = $2
            RETURNING *
            "#,
        )
        .bind(content.id)
        .bind(content.location_id)
        .bind(&content.title)
        .bind(&content.body)
        .bind(to_jsonb(&content.media_urls)?)
        .bind(to_jsonb(&content.platforms)?)
        .bind(to_jsonb(&content.schedule)?)
        .bind(to_jsonb(&content.workflow)?)
        .bind(content.status.as_str())
        .bind(to_jsonb(&content.publish_results)?)
        .bind(to_jsonb(&content.approval_history)?)
        .bind(occurs_at)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result?.map(into_model).transpose()
    }

    /// Compare-and-set status commit.
    ///
    /// Writes status, publish results and approval history only if the
    /// stored status still equals `expected`. Returns the number of rows
    /// updated; 0 means a concurrent transition won.
    pub async fn commit_status(
        &self,
        content: &ScheduledContent,
        expected: ContentStatus,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("commit_content_status");
        let result = sqlx::query(
            r#"
            UPDATE scheduled_content SET
                status = $3,
                publish_results = $4,
                approval_history = $5,
                updated_at = NOW()
            WHERE id = $1 AND location_id = $2 AND status = $6
            "#,
        )
        .bind(content.id)
        .bind(content.location_id)
        .bind(content.status.as_str())
        .bind(to_jsonb(&content.publish_results)?)
        .bind(to_jsonb(&content.approval_history)?)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// One-shot items whose fire instant has passed, across tenants.
    pub async fn find_due(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ScheduledContent>, sqlx::Error> {
        let timer = QueryTimer::new("find_due_content");
        let result = sqlx::query_as::<_, ScheduledContentEntity>(
            r#"
            SELECT * FROM scheduled_content
            WHERE status = 'scheduled' AND occurs_at IS NOT NULL AND occurs_at <= $1
            ORDER BY occurs_at ASC
            LIMIT $2
            "#,
        )
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result?.into_iter().map(into_model).collect()
    }

    /// Delete an item unless it is published.
    /// Returns the number of rows deleted (0 or 1).
    pub async fn delete(&self, location_id: Uuid, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_content");
        let result = sqlx::query(
            r#"
            DELETE FROM scheduled_content
            WHERE id = $1 AND location_id = $2 AND status <> 'published'
            "#,
        )
        .bind(id)
        .bind(location_id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}
