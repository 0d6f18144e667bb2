//! Telegram notification service.
//!
//! Sends workflow notifications through the Telegram Bot API. Failures
//! are reported back as `NotificationResult::Failed` and never bubble up
//! into the triggering request.

use reqwest::Client;
use std::time::Duration;

use domain::services::{
    ApprovalRequestedPayload, NotificationResult, NotificationService, PublishFailedPayload,
};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const SEND_TIMEOUT_SECS: u64 = 10;

/// Notification service backed by a Telegram bot.
pub struct TelegramNotifier {
    client: Client,
    bot_token: String,
}

#[derive(serde::Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(SEND_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            bot_token: bot_token.into(),
        })
    }

    async fn send_message(&self, chat_id: &str, text: String) -> NotificationResult {
        let url = format!("{}/bot{}/sendMessage", TELEGRAM_API_BASE, self.bot_token);
        let request = SendMessageRequest { chat_id, text };

        match self.client.post(&url).json(&request).send().await {
            Ok(response) if response.status().is_success() => NotificationResult::Sent,
            Ok(response) => {
                NotificationResult::Failed(format!("Telegram returned {}", response.status()))
            }
            Err(e) => NotificationResult::Failed(format!("Telegram request failed: {}", e)),
        }
    }
}

fn format_approval_message(payload: &ApprovalRequestedPayload) -> String {
    let title = payload.title.as_deref().unwrap_or("(untitled)");
    format!(
        "Content awaiting approval: {}\nSubmitted by: {}\nApprovers: {}",
        title,
        payload.requested_by,
        payload.approvers.join(", ")
    )
}

fn format_failure_message(payload: &PublishFailedPayload) -> String {
    let title = payload.title.as_deref().unwrap_or("(untitled)");
    let failures: Vec<String> = payload
        .failures
        .iter()
        .map(|(platform, reason)| format!("{}: {}", platform, reason))
        .collect();
    format!(
        "Publish failed for: {}\n{}",
        title,
        failures.join("\n")
    )
}

/// Notifier used when Telegram is not configured. Every send is skipped.
pub struct DisabledNotifier;

#[async_trait::async_trait]
impl NotificationService for DisabledNotifier {
    async fn send_approval_requested(
        &self,
        _chat_id: &str,
        _payload: ApprovalRequestedPayload,
    ) -> NotificationResult {
        NotificationResult::Skipped
    }

    async fn send_publish_failed(
        &self,
        _chat_id: &str,
        _payload: PublishFailedPayload,
    ) -> NotificationResult {
        NotificationResult::Skipped
    }
}

#[async_trait::async_trait]
impl NotificationService for TelegramNotifier {
    async fn send_approval_requested(
        &self,
        chat_id: &str,
        payload: ApprovalRequestedPayload,
    ) -> NotificationResult {
        self.send_message(chat_id, format_approval_message(&payload))
            .await
    }

    async fn send_publish_failed(
        &self,
        chat_id: &str,
        payload: PublishFailedPayload,
    ) -> NotificationResult {
        self.send_message(chat_id, format_failure_message(&payload))
            .await
    }
}
