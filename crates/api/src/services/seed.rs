//! System template seeding.
//!
//! Runs at startup and inserts the built-in templates every tenant sees.
//! Seeding is idempotent: templates are matched by name.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use domain::models::template::{ContentTemplate, ContentType, FieldType, TemplateField};
use domain::models::Platform;
use persistence::repositories::TemplateRepository;

fn field(name: &str, label: &str, field_type: FieldType, required: bool) -> TemplateField {
    TemplateField {
        name: name.to_string(),
        label: label.to_string(),
        field_type,
        required,
    }
}

fn template(
    name: &str,
    description: &str,
    content_type: ContentType,
    platforms: Vec<Platform>,
    fields: Vec<TemplateField>,
    defaults: serde_json::Value,
) -> ContentTemplate {
    let now = Utc::now();
    ContentTemplate {
        id: Uuid::new_v4(),
        location_id: None,
        name: name.to_string(),
        description: Some(description.to_string()),
        content_type,
        platforms,
        fields,
        defaults,
        is_system_template: true,
        created_at: now,
        updated_at: now,
    }
}

/// The built-in template catalogue.
pub fn system_templates() -> Vec<ContentTemplate> {
    vec![
        template(
            "Promo Post",
            "Short promotional post for a product or offer",
            ContentType::SocialPost,
            vec![
                Platform::Facebook,
                Platform::Instagram,
                Platform::Linkedin,
                Platform::Twitter,
            ],
            vec![
                field("headline", "Headline", FieldType::Text, true),
                field("body", "Body", FieldType::LongText, true),
                field("image", "Image", FieldType::Image, false),
                field("link", "Link", FieldType::Url, false),
            ],
            serde_json::json!({"headline": "Limited time offer"}),
        ),
        template(
            "Event Announcement",
            "Announce an upcoming event with date and venue",
            ContentType::SocialPost,
            vec![
                Platform::Facebook,
                Platform::Instagram,
                Platform::GoogleBusiness,
            ],
            vec![
                field("event_name", "Event name", FieldType::Text, true),
                field("details", "Details", FieldType::LongText, true),
                field("cover", "Cover image", FieldType::Image, false),
            ],
            serde_json::json!({}),
        ),
        template(
            "Weekly Update",
            "Longer-form weekly update for the company blog",
            ContentType::Blog,
            vec![Platform::Linkedin],
            vec![
                field("title", "Title", FieldType::Text, true),
                field("body", "Body", FieldType::LongText, true),
                field("hero", "Hero image", FieldType::Image, false),
            ],
            serde_json::json!({}),
        ),
        template(
            "Newsletter",
            "Email newsletter with a featured story",
            ContentType::Email,
            vec![Platform::Facebook, Platform::Linkedin],
            vec![
                field("subject", "Subject", FieldType::Text, true),
                field("body", "Body", FieldType::LongText, true),
                field("cta_link", "Call-to-action link", FieldType::Url, false),
            ],
            serde_json::json!({"subject": "This week at a glance"}),
        ),
    ]
}

/// Insert missing system templates.
pub async fn seed_system_templates(repo: &TemplateRepository) -> Result<usize, sqlx::Error> {
    let mut inserted = 0;
    for template in system_templates() {
        if repo.find_system_by_name(&template.name).await?.is_none() {
            repo.create(&template).await?;
            inserted += 1;
            info!(name = %template.name, "Seeded system template");
        }
    }
    Ok(inserted)
}
