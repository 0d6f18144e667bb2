//! Repository implementations for database operations.
//!
//! Repositories return domain models; JSONB columns are decoded on the
//! way out and malformed rows surface as decode errors.

pub mod content;
pub mod template;

pub use content::ContentRepository;
pub use template::TemplateRepository;

/// Encode a domain value for a JSONB column.
pub(crate) fn to_jsonb<T: serde::Serialize>(
    value: &T,
) -> Result<serde_json::Value, sqlx::Error> {
    serde_json::to_value(value).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

/// Decode an entity row into its domain model.
pub(crate) fn into_model<E, M>(entity: E) -> Result<M, sqlx::Error>
where
    M: TryFrom<E, Error = serde_json::Error>,
{
    M::try_from(entity).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}
