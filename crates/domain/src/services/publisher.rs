//! Platform publisher seam and retry bookkeeping.
//!
//! The trait hides the per-platform transport; the pure helpers decide
//! which platforms a dispatch attempt must target and how fresh results
//! merge with earlier ones. Retries re-attempt only platforms that have
//! not succeeded yet.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::platform::{Platform, PlatformResult};

/// Everything a platform adapter needs to publish one item.
#[derive(Debug, Clone)]
pub struct PublishPayload {
    pub content_id: Uuid,
    pub location_id: Uuid,
    pub title: Option<String>,
    pub body: String,
    pub media_urls: Vec<String>,
}

/// Outcome of one platform publish call.
pub type PublishOutcome = Result<String, String>;

/// Transport seam for publishing to one platform.
///
/// Implementations must not panic; transport failures come back as the
/// `Err` reason string and become a per-platform failure record.
#[async_trait]
pub trait PlatformPublisher: Send + Sync {
    /// Publish the payload to the platform, returning the remote
    /// reference on success.
    async fn publish(&self, platform: Platform, payload: &PublishPayload) -> PublishOutcome;
}

/// Platforms a dispatch attempt must target: everything in `platforms`
/// without a prior success in `previous`.
pub fn platforms_to_attempt(
    platforms: &[Platform],
    previous: &[PlatformResult],
) -> Vec<Platform> {
    let succeeded: HashSet<Platform> = previous
        .iter()
        .filter(|r| r.success)
        .map(|r| r.platform)
        .collect();
    platforms
        .iter()
        .copied()
        .filter(|p| !succeeded.contains(p))
        .collect()
}

/// Merge fresh attempt results over earlier ones.
///
/// Earlier successes are kept untouched; any platform re-attempted this
/// round takes its fresh record. Order follows `previous` with new
/// platforms appended.
pub fn merge_results(
    previous: &[PlatformResult],
    fresh: Vec<PlatformResult>,
) -> Vec<PlatformResult> {
    let mut merged: Vec<PlatformResult> = Vec::with_capacity(previous.len() + fresh.len());
    for old in previous {
        match fresh.iter().find(|r| r.platform == old.platform) {
            Some(replacement) if !old.success => merged.push(replacement.clone()),
            _ => merged.push(old.clone()),
        }
    }
    for result in fresh {
        if !merged.iter().any(|r| r.platform == result.platform) {
            merged.push(result);
        }
    }
    merged
}

/// Whether a non-empty result set is all successes.
pub fn all_succeeded(results: &[PlatformResult]) -> bool {
    !results.is_empty() && results.iter().all(|r| r.success)
}

/// In-memory publisher for tests. Succeeds by default; platforms in the
/// failure set return a canned error reason.
pub struct MockPublisher {
    fail: HashSet<Platform>,
    calls: Mutex<Vec<(Platform, Uuid)>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self {
            fail: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A publisher that fails for the given platforms.
    pub fn failing(platforms: impl IntoIterator<Item = Platform>) -> Self {
        Self {
            fail: platforms.into_iter().collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Platforms publish was called for, in call order.
    pub fn calls(&self) -> Vec<(Platform, Uuid)> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for MockPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlatformPublisher for MockPublisher {
    async fn publish(&self, platform: Platform, payload: &PublishPayload) -> PublishOutcome {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((platform, payload.content_id));
        }
        if self.fail.contains(&platform) {
            Err(format!("mock failure for {}", platform))
        } else {
            Ok(format!("mock-{}-{}", platform, payload.content_id))
        }
    }
}

/// Build a `PlatformResult` from one adapter outcome.
pub fn result_from_outcome(
    platform: Platform,
    outcome: PublishOutcome,
    at: DateTime<Utc>,
) -> PlatformResult {
    match outcome {
        Ok(remote_ref) => PlatformResult::ok(platform, remote_ref, at),
        Err(reason) => PlatformResult::failed(platform, reason, at),
    }
}
