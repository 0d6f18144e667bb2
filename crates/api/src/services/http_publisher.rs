//! HTTP platform publisher adapter.
//!
//! Publishes through a single outbound gateway; the platform name is the
//! last path segment. Payloads are signed with HMAC-SHA256 so the gateway
//! can verify origin.

use hmac::{Hmac, Mac};
use reqwest::Client;
use sha2::Sha256;
use std::time::Duration;

use domain::models::Platform;
use domain::services::{PlatformPublisher, PublishOutcome, PublishPayload};

use crate::config::PublishersConfig;

/// HTTP publisher backed by the configured gateway.
pub struct HttpPublisher {
    client: Client,
    base_url: String,
    signing_secret: String,
}

#[derive(serde::Serialize)]
struct GatewayRequest<'a> {
    content_id: uuid::Uuid,
    location_id: uuid::Uuid,
    title: Option<&'a str>,
    body: &'a str,
    media_urls: &'a [String],
}

#[derive(serde::Deserialize)]
struct GatewayResponse {
    /// Remote reference assigned by the platform.
    post_id: Option<String>,
}

impl HttpPublisher {
    pub fn new(config: &PublishersConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            signing_secret: config.signing_secret.clone(),
        })
    }

    /// Sign the payload with HMAC-SHA256.
    fn sign_payload(&self, payload: &str) -> Result<String, String> {
        type HmacSha256 = Hmac<Sha256>;

        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .map_err(|e| format!("signing error: {}", e))?;
        mac.update(payload.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        Ok(format!("sha256={}", signature))
    }
}

#[async_trait::async_trait]
impl PlatformPublisher for HttpPublisher {
    async fn publish(&self, platform: Platform, payload: &PublishPayload) -> PublishOutcome {
        let request = GatewayRequest {
            content_id: payload.content_id,
            location_id: payload.location_id,
            title: payload.title.as_deref(),
            body: &payload.body,
            media_urls: &payload.media_urls,
        };
        let body = serde_json::to_string(&request).map_err(|e| e.to_string())?;
        let signature = self.sign_payload(&body)?;
        let url = format!("{}/{}", self.base_url, platform);

        // A timeout surfaces here as a transport error and becomes a
        // per-platform failure, never a process-level error.
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("X-Content-Signature", signature)
            .body(body)
            .send()
            .await
            .map_err(|e| format!("transport error: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("gateway returned {}", status.as_u16()));
        }

        let remote_ref = response
            .json::<GatewayResponse>()
            .await
            .ok()
            .and_then(|r| r.post_id)
            .unwrap_or_else(|| format!("{}:{}", platform, payload.content_id));
        Ok(remote_ref)
    }
}
