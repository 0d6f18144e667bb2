//! Workflow descriptor and approval history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::status::WorkflowAction;

/// Approval workflow settings, owned by a scheduled-content item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WorkflowSettings {
    /// When true the item starts in `pending_approval` and must pass
    /// through an approver before it becomes eligible for dispatch.
    pub requires_approval: bool,

    /// Ordered approver identifiers. Non-empty iff approval is required.
    #[serde(default)]
    pub approvers: Vec<String>,

    /// Send a Telegram notification when the item enters review and when
    /// a publish attempt fails.
    #[serde(default)]
    pub notify_via_telegram: bool,

    /// Chat to notify; required when `notify_via_telegram` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram_chat_id: Option<String>,
}

impl WorkflowSettings {
    /// A workflow that publishes without review.
    pub fn auto_publish() -> Self {
        Self {
            requires_approval: false,
            approvers: Vec::new(),
            notify_via_telegram: false,
            telegram_chat_id: None,
        }
    }

    /// Validate the descriptor's internal consistency.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.requires_approval && self.approvers.is_empty() {
            return Err(EngineError::Validation(
                "Approval workflows require at least one approver".to_string(),
            ));
        }
        if self.notify_via_telegram && self.telegram_chat_id.is_none() {
            return Err(EngineError::Validation(
                "Telegram notifications require a chat id".to_string(),
            ));
        }
        Ok(())
    }
}

/// One entry in a content item's approval history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ApprovalEntry {
    pub actor: String,
    pub action: WorkflowAction,
    pub timestamp: DateTime<Utc>,
    /// Approver comment, rejection reason or revision feedback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ApprovalEntry {
    pub fn new(
        actor: impl Into<String>,
        action: WorkflowAction,
        note: Option<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            actor: actor.into(),
            action,
            timestamp: at,
            note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_publish_validates() {
        assert!(WorkflowSettings::auto_publish().validate().is_ok());
    }

    #[test]
    fn test_approval_requires_approvers() {
        let workflow = WorkflowSettings {
            requires_approval: true,
            approvers: Vec::new(),
            notify_via_telegram: false,
            telegram_chat_id: None,
        };
        assert!(workflow.validate().is_err());

        let workflow = WorkflowSettings {
            approvers: vec!["reviewer@agency.test".to_string()],
            ..workflow
        };
        assert!(workflow.validate().is_ok());
    }

    #[test]
    fn test_telegram_requires_chat_id() {
        let workflow = WorkflowSettings {
            requires_approval: false,
            approvers: Vec::new(),
            notify_via_telegram: true,
            telegram_chat_id: None,
        };
        assert!(workflow.validate().is_err());

        let workflow = WorkflowSettings {
            telegram_chat_id: Some("-100123".to_string()),
            ..workflow
        };
        assert!(workflow.validate().is_ok());
    }

    #[test]
    fn test_approval_entry_serialization() {
        let entry = ApprovalEntry::new(
            "reviewer@agency.test",
            WorkflowAction::Reject,
            Some("Off-brand imagery".to_string()),
            Utc::now(),
        );
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"action\":\"reject\""));
        assert!(json.contains("\"note\":\"Off-brand imagery\""));
    }
}
