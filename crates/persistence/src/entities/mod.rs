//! Database entity definitions.
//!
//! Entities are direct mappings to database rows. JSONB columns are
//! decoded into domain types when converting to models.

pub mod content;
pub mod template;

pub use content::ScheduledContentEntity;
pub use template::ContentTemplateEntity;
