//! Content template domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::platform::Platform;

/// Kind of content a template produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    SocialPost,
    Blog,
    Email,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentType::SocialPost => write!(f, "social_post"),
            ContentType::Blog => write!(f, "blog"),
            ContentType::Email => write!(f, "email"),
        }
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "social_post" => Ok(ContentType::SocialPost),
            "blog" => Ok(ContentType::Blog),
            "email" => Ok(ContentType::Email),
            other => Err(format!("Unknown content type: {}", other)),
        }
    }
}

/// Input widget type of a template field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    LongText,
    Image,
    Url,
}

/// One typed field definition in a template's field structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TemplateField {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
}

/// Represents a reusable content blueprint.
///
/// System templates (`location_id` is `None`, `is_system_template` set) are
/// seeded at boot and immutable from the tenant's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ContentTemplate {
    pub id: Uuid,
    /// Owning tenant; `None` for system templates.
    pub location_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub content_type: ContentType,
    /// Platforms content built from this template may target.
    pub platforms: Vec<Platform>,
    /// Ordered field structure.
    pub fields: Vec<TemplateField>,
    /// Default values keyed by field name.
    pub defaults: serde_json::Value,
    pub is_system_template: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentTemplate {
    /// Whether the template supports publishing to the given platform.
    pub fn supports(&self, platform: Platform) -> bool {
        self.platforms.contains(&platform)
    }
}

/// Request payload for creating a template.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateTemplateRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    pub content_type: ContentType,

    #[validate(length(min = 1, message = "Platform set must not be empty"))]
    pub platforms: Vec<Platform>,

    #[validate(length(min = 1, message = "Field structure must not be empty"))]
    pub fields: Vec<TemplateField>,

    #[serde(default = "default_defaults")]
    pub defaults: serde_json::Value,
}

fn default_defaults() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Request payload for updating a template (partial update).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateTemplateRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    pub content_type: Option<ContentType>,

    #[validate(length(min = 1, message = "Platform set must not be empty"))]
    pub platforms: Option<Vec<Platform>>,

    #[validate(length(min = 1, message = "Field structure must not be empty"))]
    pub fields: Option<Vec<TemplateField>>,

    pub defaults: Option<serde_json::Value>,
}

/// Response payload for template operations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TemplateResponse {
    pub id: Uuid,
    pub location_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub content_type: ContentType,
    pub platforms: Vec<Platform>,
    pub fields: Vec<TemplateField>,
    pub defaults: serde_json::Value,
    pub is_system_template: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ContentTemplate> for TemplateResponse {
    fn from(t: ContentTemplate) -> Self {
        Self {
            id: t.id,
            location_id: t.location_id,
            name: t.name,
            description: t.description,
            content_type: t.content_type,
            platforms: t.platforms,
            fields: t.fields,
            defaults: t.defaults,
            is_system_template: t.is_system_template,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Response for listing templates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListTemplatesResponse {
    pub templates: Vec<TemplateResponse>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn sample_template() -> ContentTemplate {
        ContentTemplate {
            id: Uuid::new_v4(),
            location_id: Some(Uuid::new_v4()),
            name: "Weekly promo".to_string(),
            description: None,
            content_type: ContentType::SocialPost,
            platforms: vec![Platform::Facebook, Platform::Instagram],
            fields: vec![TemplateField {
                name: "headline".to_string(),
                label: "Headline".to_string(),
                field_type: FieldType::Text,
                required: true,
            }],
            defaults: serde_json::json!({"headline": "This week only"}),
            is_system_template: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_supports_platform() {
        let template = sample_template();
        assert!(template.supports(Platform::Facebook));
        assert!(!template.supports(Platform::Tiktok));
    }

    #[test]
    fn test_create_request_requires_platforms_and_fields() {
        let json = r#"{
            "name": "Promo",
            "content_type": "social_post",
            "platforms": [],
            "fields": []
        }"#;
        let request: CreateTemplateRequest = serde_json::from_str(json).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("platforms"));
        assert!(errors.field_errors().contains_key("fields"));
    }

    #[test]
    fn test_create_request_deserialization_with_defaults() {
        let json = r#"{
            "name": "Promo",
            "content_type": "social_post",
            "platforms": ["facebook"],
            "fields": [
                {"name": "body", "label": "Body", "field_type": "long_text", "required": true}
            ]
        }"#;
        let request: CreateTemplateRequest = serde_json::from_str(json).unwrap();
        assert!(request.validate().is_ok());
        assert!(request.defaults.as_object().unwrap().is_empty());
        assert_eq!(request.fields[0].field_type, FieldType::LongText);
    }

    #[test]
    fn test_update_request_partial() {
        let json = r#"{"name": "Renamed"}"#;
        let request: UpdateTemplateRequest = serde_json::from_str(json).unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.name, Some("Renamed".to_string()));
        assert!(request.platforms.is_none());
    }

    #[test]
    fn test_update_request_rejects_empty_platform_set() {
        let json = r#"{"platforms": []}"#;
        let request: UpdateTemplateRequest = serde_json::from_str(json).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_template_response_serialization() {
        let response: TemplateResponse = sample_template().into();
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"name\":\"Weekly promo\""));
        assert!(json.contains("\"content_type\":\"social_post\""));
        assert!(json.contains("\"is_system_template\":false"));
    }
}
