//! Target platform model and per-platform publish outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A publish target platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Facebook,
    Instagram,
    Linkedin,
    Twitter,
    Tiktok,
    GoogleBusiness,
}

impl Platform {
    /// All supported platforms, in display order.
    pub const ALL: [Platform; 6] = [
        Platform::Facebook,
        Platform::Instagram,
        Platform::Linkedin,
        Platform::Twitter,
        Platform::Tiktok,
        Platform::GoogleBusiness,
    ];

    /// Stable string key used in storage, metrics labels and config.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::Linkedin => "linkedin",
            Platform::Twitter => "twitter",
            Platform::Tiktok => "tiktok",
            Platform::GoogleBusiness => "google_business",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "facebook" => Ok(Platform::Facebook),
            "instagram" => Ok(Platform::Instagram),
            "linkedin" => Ok(Platform::Linkedin),
            "twitter" => Ok(Platform::Twitter),
            "tiktok" => Ok(Platform::Tiktok),
            "google_business" => Ok(Platform::GoogleBusiness),
            other => Err(format!("Unknown platform: {}", other)),
        }
    }
}

/// Outcome of one publish attempt against one platform.
///
/// Failures are recorded, not thrown: a dispatch across three platforms
/// where one fails must keep the two successes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PlatformResult {
    pub platform: Platform,
    pub success: bool,
    /// Remote identifier returned by the platform on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_ref: Option<String>,
    /// Failure reason reported by the adapter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    pub attempted_at: DateTime<Utc>,
}

impl PlatformResult {
    /// A successful publish result.
    pub fn ok(platform: Platform, remote_ref: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            platform,
            success: true,
            remote_ref: Some(remote_ref.into()),
            error_reason: None,
            attempted_at: at,
        }
    }

    /// A failed publish result.
    pub fn failed(platform: Platform, reason: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            platform,
            success: false,
            remote_ref: None,
            error_reason: Some(reason.into()),
            attempted_at: at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_roundtrip() {
        for platform in Platform::ALL {
            let parsed: Platform = platform.as_str().parse().unwrap();
            assert_eq!(parsed, platform);
        }
    }

    #[test]
    fn test_platform_from_str_unknown() {
        assert!("myspace".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_serde_uses_snake_case() {
        let json = serde_json::to_string(&Platform::GoogleBusiness).unwrap();
        assert_eq!(json, "\"google_business\"");

        let parsed: Platform = serde_json::from_str("\"facebook\"").unwrap();
        assert_eq!(parsed, Platform::Facebook);
    }

    #[test]
    fn test_platform_result_serialization_skips_absent_fields() {
        let ok = PlatformResult::ok(Platform::Facebook, "fb-post-1", Utc::now());
        let json = serde_json::to_string(&ok).unwrap();
        assert!(json.contains("\"remote_ref\":\"fb-post-1\""));
        assert!(!json.contains("error_reason"));

        let failed = PlatformResult::failed(Platform::Twitter, "rate limited", Utc::now());
        let json = serde_json::to_string(&failed).unwrap();
        assert!(json.contains("\"error_reason\":\"rate limited\""));
        assert!(!json.contains("remote_ref"));
    }
}
