//! Content template entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::template::{ContentTemplate, ContentType};
use domain::models::Platform;

/// Database row mapping for the content_templates table.
#[derive(Debug, Clone, FromRow)]
pub struct ContentTemplateEntity {
    pub id: Uuid,
    pub location_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub content_type: String,
    /// JSONB array of platform names.
    pub platforms: serde_json::Value,
    /// JSONB array of field definitions.
    pub fields: serde_json::Value,
    /// JSONB object of default values keyed by field name.
    pub defaults: serde_json::Value,
    pub is_system_template: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ContentTemplateEntity> for ContentTemplate {
    type Error = serde_json::Error;

    fn try_from(entity: ContentTemplateEntity) -> Result<Self, Self::Error> {
        let content_type: ContentType =
            serde_json::from_value(serde_json::Value::String(entity.content_type))?;
        let platforms: Vec<Platform> = serde_json::from_value(entity.platforms)?;
        let fields = serde_json::from_value(entity.fields)?;
        Ok(ContentTemplate {
            id: entity.id,
            location_id: entity.location_id,
            name: entity.name,
            description: entity.description,
            content_type,
            platforms,
            fields,
            defaults: entity.defaults,
            is_system_template: entity.is_system_template,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_test_template_entity() -> ContentTemplateEntity {
        ContentTemplateEntity {
            id: Uuid::new_v4(),
            location_id: None,
            name: "Weekly Special".to_string(),
            description: Some("Promote a weekly offer".to_string()),
            content_type: "social_post".to_string(),
            platforms: json!(["facebook", "instagram"]),
            fields: json!([
                {"name": "headline", "label": "Headline", "field_type": "text", "required": true},
                {"name": "body", "label": "Body", "field_type": "long_text", "required": true}
            ]),
            defaults: json!({"headline": "This week only"}),
            is_system_template: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_entity_converts_to_model() {
        let entity = create_test_template_entity();
        let model = ContentTemplate::try_from(entity).unwrap();
        assert_eq!(model.content_type, ContentType::SocialPost);
        assert_eq!(model.platforms, vec![Platform::Facebook, Platform::Instagram]);
        assert_eq!(model.fields.len(), 2);
        assert!(model.is_system_template);
    }

    #[test]
    fn test_entity_with_bad_json_fails_conversion() {
        let mut entity = create_test_template_entity();
        entity.platforms = json!("not-an-array");
        assert!(ContentTemplate::try_from(entity).is_err());
    }

    #[test]
    fn test_entity_with_unknown_content_type_fails_conversion() {
        let mut entity = create_test_template_entity();
        entity.content_type = "podcast".to_string();
        assert!(ContentTemplate::try_from(entity).is_err());
    }
}
