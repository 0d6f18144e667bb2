//! Workflow status and the transition table.
//!
//! Status is a closed enumeration with an explicit transition table rather
//! than a hierarchy of content types: every (state, action) pair is decided
//! in one place and checked exhaustively by the tests.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Lifecycle status of a scheduled-content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    Draft,
    PendingApproval,
    Approved,
    Rejected,
    RevisionRequested,
    Scheduled,
    Published,
    Failed,
}

impl ContentStatus {
    /// Every status, for exhaustive transition checks.
    pub const ALL: [ContentStatus; 8] = [
        ContentStatus::Draft,
        ContentStatus::PendingApproval,
        ContentStatus::Approved,
        ContentStatus::Rejected,
        ContentStatus::RevisionRequested,
        ContentStatus::Scheduled,
        ContentStatus::Published,
        ContentStatus::Failed,
    ];

    /// Stable string key used in storage and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::PendingApproval => "pending_approval",
            ContentStatus::Approved => "approved",
            ContentStatus::Rejected => "rejected",
            ContentStatus::RevisionRequested => "revision_requested",
            ContentStatus::Scheduled => "scheduled",
            ContentStatus::Published => "published",
            ContentStatus::Failed => "failed",
        }
    }

    /// `published` is terminal: no transition leaves it.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ContentStatus::Published)
    }
}

impl std::fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ContentStatus::Draft),
            "pending_approval" => Ok(ContentStatus::PendingApproval),
            "approved" => Ok(ContentStatus::Approved),
            "rejected" => Ok(ContentStatus::Rejected),
            "revision_requested" => Ok(ContentStatus::RevisionRequested),
            "scheduled" => Ok(ContentStatus::Scheduled),
            "published" => Ok(ContentStatus::Published),
            "failed" => Ok(ContentStatus::Failed),
            other => Err(format!("Unknown content status: {}", other)),
        }
    }
}

/// Workflow action applied to a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    Approve,
    Reject,
    RequestRevision,
    Resubmit,
    /// Record aggregated publish results; lands on `published` or `failed`
    /// depending on whether every platform succeeded.
    MarkPublished,
    RetryPublish,
}

impl std::fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowAction::Approve => write!(f, "approve"),
            WorkflowAction::Reject => write!(f, "reject"),
            WorkflowAction::RequestRevision => write!(f, "request_revision"),
            WorkflowAction::Resubmit => write!(f, "resubmit"),
            WorkflowAction::MarkPublished => write!(f, "mark_published"),
            WorkflowAction::RetryPublish => write!(f, "retry_publish"),
        }
    }
}

impl ContentStatus {
    /// The transition table.
    ///
    /// For `MarkPublished`, `all_succeeded` selects between the two legal
    /// outcomes; it is ignored by every other action.
    pub fn transition(
        self,
        action: WorkflowAction,
        all_succeeded: bool,
    ) -> Result<ContentStatus, EngineError> {
        use ContentStatus::*;
        use WorkflowAction::*;

        let next = match (self, action) {
            (PendingApproval, Approve) => Scheduled,
            (PendingApproval, Reject) => Rejected,
            (PendingApproval, RequestRevision) => RevisionRequested,
            (Draft, Resubmit) | (Rejected, Resubmit) => PendingApproval,
            (Scheduled, MarkPublished) => {
                if all_succeeded {
                    Published
                } else {
                    Failed
                }
            }
            (Failed, RetryPublish) => Scheduled,
            (from, action) => {
                return Err(EngineError::invalid_transition(
                    from.to_string(),
                    action.to_string(),
                ));
            }
        };
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approve_only_from_pending_approval() {
        for status in ContentStatus::ALL {
            let result = status.transition(WorkflowAction::Approve, true);
            if status == ContentStatus::PendingApproval {
                assert_eq!(result.unwrap(), ContentStatus::Scheduled);
            } else {
                assert!(
                    matches!(result, Err(EngineError::InvalidTransition { .. })),
                    "approve must fail from {}",
                    status
                );
            }
        }
    }

    #[test]
    fn test_reject_and_request_revision_only_from_pending_approval() {
        for status in ContentStatus::ALL {
            let reject = status.transition(WorkflowAction::Reject, true);
            let revise = status.transition(WorkflowAction::RequestRevision, true);
            if status == ContentStatus::PendingApproval {
                assert_eq!(reject.unwrap(), ContentStatus::Rejected);
                assert_eq!(revise.unwrap(), ContentStatus::RevisionRequested);
            } else {
                assert!(reject.is_err());
                assert!(revise.is_err());
            }
        }
    }

    #[test]
    fn test_resubmit_only_from_draft_or_rejected() {
        for status in ContentStatus::ALL {
            let result = status.transition(WorkflowAction::Resubmit, true);
            match status {
                ContentStatus::Draft | ContentStatus::Rejected => {
                    assert_eq!(result.unwrap(), ContentStatus::PendingApproval);
                }
                _ => assert!(result.is_err(), "resubmit must fail from {}", status),
            }
        }
    }

    #[test]
    fn test_resubmit_not_allowed_directly_from_revision_requested() {
        // Revision-requested items must be edited back to draft first.
        let result =
            ContentStatus::RevisionRequested.transition(WorkflowAction::Resubmit, true);
        assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
    }

    #[test]
    fn test_mark_published_outcome_depends_on_results() {
        assert_eq!(
            ContentStatus::Scheduled
                .transition(WorkflowAction::MarkPublished, true)
                .unwrap(),
            ContentStatus::Published
        );
        assert_eq!(
            ContentStatus::Scheduled
                .transition(WorkflowAction::MarkPublished, false)
                .unwrap(),
            ContentStatus::Failed
        );

        for status in ContentStatus::ALL {
            if status != ContentStatus::Scheduled {
                assert!(status.transition(WorkflowAction::MarkPublished, true).is_err());
            }
        }
    }

    #[test]
    fn test_retry_publish_only_from_failed() {
        for status in ContentStatus::ALL {
            let result = status.transition(WorkflowAction::RetryPublish, true);
            if status == ContentStatus::Failed {
                assert_eq!(result.unwrap(), ContentStatus::Scheduled);
            } else {
                assert!(result.is_err());
            }
        }
    }

    #[test]
    fn test_published_is_terminal_for_every_action() {
        let actions = [
            WorkflowAction::Approve,
            WorkflowAction::Reject,
            WorkflowAction::RequestRevision,
            WorkflowAction::Resubmit,
            WorkflowAction::MarkPublished,
            WorkflowAction::RetryPublish,
        ];
        for action in actions {
            assert!(ContentStatus::Published.transition(action, true).is_err());
        }
        assert!(ContentStatus::Published.is_terminal());
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in ContentStatus::ALL {
            let parsed: ContentStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("archived".parse::<ContentStatus>().is_err());
    }
}
