//! Cleanup Tracker
//!
//! Ordered ledger of resources a test created, deleted at teardown.
//!
//! Deletion runs newest-first so children created inside a parent (a card in
//! a deck) go before the parent. When a resource names its parent explicitly
//! that constraint always wins; otherwise newest-first is only a heuristic.
//!
//! Each deletion is retried per the [`RetryPolicy`]. A resource that still
//! fails is recorded in the failure list and cleanup moves on. Nothing ever
//! propagates out of [`CleanupTracker::cleanup`].

use crate::api::ApiContext;
use crate::resource::{DeletionMethod, FailedCleanup, ResourceKey, TrackedResource};
use crate::result::{WardenError, WardenResult};
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;
use tracing::{debug, info, warn};

/// Browser-driven deletion, supplied by the caller.
///
/// The tracker does not know how to click through a UI; the page object
/// that created the resource does.
#[async_trait]
pub trait UiDeleter: Send + Sync {
    /// Delete `resource` through the UI.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource could not be removed.
    async fn delete(&self, resource: &TrackedResource) -> WardenResult<()>;
}

/// [`UiDeleter`] for runs without a browser; every UI deletion fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUi;

#[async_trait]
impl UiDeleter for NoUi {
    async fn delete(&self, resource: &TrackedResource) -> WardenResult<()> {
        Err(WardenError::ui(format!(
            "no browser available to delete {} '{}'",
            resource.kind, resource.id
        )))
    }
}

/// Counts from one cleanup pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupSummary {
    /// Resources processed
    pub attempted: usize,
    /// Resources deleted (or already gone)
    pub deleted: usize,
    /// Resources moved to the failure list
    pub failed: usize,
}

impl CleanupSummary {
    /// Whether every resource was deleted
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Ledger of resources created during a test.
///
/// # Example
///
/// ```ignore
/// let mut tracker = CleanupTracker::new();
/// tracker.track(TrackedResource::api("deck", "d1", "Deck", "/decks/d1"));
/// tracker.track(TrackedResource::api("card", "c1", "Card", "/cards/c1"));
///
/// // DELETE /cards/c1, then DELETE /decks/d1
/// let summary = tracker.cleanup(&NoUi, &api).await;
/// if tracker.has_failures() {
///     eprintln!("{}", tracker.failure_report());
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CleanupTracker {
    resources: Vec<TrackedResource>,
    failures: Vec<FailedCleanup>,
    policy: RetryPolicy,
}

impl CleanupTracker {
    /// Tracker with the default policy (3 attempts, 1 s apart)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker with a custom retry policy
    #[must_use]
    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Retry policy used for deletions
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Register a resource; its `created_at` is set to now.
    ///
    /// The same resource tracked twice is deleted twice.
    pub fn track(&mut self, mut resource: TrackedResource) {
        resource.created_at = Utc::now();
        debug!(resource = %resource.describe(), "tracking resource");
        self.resources.push(resource);
    }

    /// Pending resources in registration order
    #[must_use]
    pub fn all(&self) -> &[TrackedResource] {
        &self.resources
    }

    /// Number of pending resources
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether nothing is pending
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Forget pending resources without deleting them.
    pub fn clear(&mut self) {
        if !self.resources.is_empty() {
            debug!(count = self.resources.len(), "discarding tracked resources");
        }
        self.resources.clear();
    }

    /// Order [`CleanupTracker::cleanup`] will delete pending resources in.
    #[must_use]
    pub fn deletion_order(&self) -> Vec<&TrackedResource> {
        deletion_order(&self.resources)
            .into_iter()
            .map(|i| &self.resources[i])
            .collect()
    }

    /// Delete every pending resource, one at a time.
    ///
    /// API resources go through `api`, UI resources through `ui`. The ledger
    /// is empty afterwards; resources that could not be deleted are in
    /// [`CleanupTracker::failures`].
    pub async fn cleanup<U, A>(&mut self, ui: &U, api: &A) -> CleanupSummary
    where
        U: UiDeleter + ?Sized,
        A: ApiContext + ?Sized,
    {
        let resources = std::mem::take(&mut self.resources);
        let mut summary = CleanupSummary {
            attempted: resources.len(),
            ..CleanupSummary::default()
        };
        if resources.is_empty() {
            return summary;
        }

        for index in deletion_order(&resources) {
            let resource = &resources[index];
            match self.delete_with_retry(resource, ui, api).await {
                Ok(attempts) => {
                    debug!(resource = %resource.describe(), attempts, "resource deleted");
                    summary.deleted += 1;
                }
                Err((attempts, error)) => {
                    warn!(
                        resource = %resource.describe(),
                        attempts,
                        %error,
                        "resource cleanup failed"
                    );
                    summary.failed += 1;
                    self.failures.push(FailedCleanup {
                        resource: resource.clone(),
                        error: error.to_string(),
                        attempts,
                        failed_at: Utc::now(),
                    });
                }
            }
        }

        info!(
            attempted = summary.attempted,
            deleted = summary.deleted,
            failed = summary.failed,
            "cleanup finished"
        );
        summary
    }

    async fn delete_with_retry<U, A>(
        &self,
        resource: &TrackedResource,
        ui: &U,
        api: &A,
    ) -> Result<u32, (u32, WardenError)>
    where
        U: UiDeleter + ?Sized,
        A: ApiContext + ?Sized,
    {
        if resource.method == DeletionMethod::Api && resource.path.is_none() {
            return Err((
                0,
                WardenError::config(format!(
                    "{} '{}' is tracked for API deletion without a path",
                    resource.kind, resource.id
                )),
            ));
        }

        self.policy
            .run(move |attempt| {
                if attempt > 1 {
                    debug!(resource = %resource.describe(), attempt, "retrying deletion");
                }
                delete_once(resource, ui, api)
            })
            .await
            .map(|retried| retried.attempts)
            .map_err(|exhausted| (exhausted.attempts, exhausted.last_error))
    }

    /// Whether any deletion failed
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Recorded failures, oldest first
    #[must_use]
    pub fn failures(&self) -> &[FailedCleanup] {
        &self.failures
    }

    /// Forget recorded failures
    pub fn clear_failures(&mut self) {
        self.failures.clear();
    }

    /// Multi-line summary of failures for CI logs
    #[must_use]
    pub fn failure_report(&self) -> String {
        failure_report(&self.failures)
    }

    /// Write pending resources to `path` as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_ledger(&self, path: impl AsRef<Path>) -> WardenResult<()> {
        let json = serde_json::to_string_pretty(&self.resources)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Append resources saved with [`CleanupTracker::save_ledger`].
    ///
    /// Saved creation timestamps are kept. Returns how many were loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_ledger(&mut self, path: impl AsRef<Path>) -> WardenResult<usize> {
        let json = std::fs::read_to_string(path)?;
        let resources: Vec<TrackedResource> = serde_json::from_str(&json)?;
        let count = resources.len();
        self.resources.extend(resources);
        Ok(count)
    }
}

async fn delete_once<U, A>(resource: &TrackedResource, ui: &U, api: &A) -> WardenResult<()>
where
    U: UiDeleter + ?Sized,
    A: ApiContext + ?Sized,
{
    match resource.method {
        DeletionMethod::Ui => ui.delete(resource).await,
        DeletionMethod::Api => {
            let path = resource.path.as_deref().unwrap_or_default();
            let verb = resource.deletion_verb();
            let response = api.send(verb, path, None).await?;
            // already gone counts as deleted
            if response.is_not_found() {
                return Ok(());
            }
            response.error_for_status(verb, path).map(|_| ())
        }
    }
}

/// Indices of `resources` in deletion order.
///
/// Newest first, except that a resource is never deleted while a pending
/// resource still names it as `parent`. Cycles fall back to newest-first.
fn deletion_order(resources: &[TrackedResource]) -> Vec<usize> {
    let keys: Vec<ResourceKey> = resources.iter().map(TrackedResource::key).collect();
    let mut blockers: Vec<usize> = keys
        .iter()
        .enumerate()
        .map(|(i, key)| {
            resources
                .iter()
                .enumerate()
                .filter(|(j, r)| *j != i && r.parent.as_ref() == Some(key))
                .count()
        })
        .collect();

    let mut done = vec![false; resources.len()];
    let mut order = Vec::with_capacity(resources.len());
    while order.len() < resources.len() {
        let next = (0..resources.len())
            .rev()
            .find(|&i| !done[i] && blockers[i] == 0)
            .or_else(|| (0..resources.len()).rev().find(|&i| !done[i]));
        let Some(next) = next else { break };

        done[next] = true;
        order.push(next);
        if let Some(parent) = &resources[next].parent {
            for (i, key) in keys.iter().enumerate() {
                if i != next && key == parent && blockers[i] > 0 {
                    blockers[i] -= 1;
                }
            }
        }
    }
    order
}

fn failure_report(failures: &[FailedCleanup]) -> String {
    if failures.is_empty() {
        return "No cleanup failures".to_string();
    }
    let mut report = format!("{} resource(s) could not be cleaned up:\n", failures.len());
    for (n, failure) in failures.iter().enumerate() {
        let _ = writeln!(report, "  {}. {}", n + 1, failure.resource.describe());
        if let Some(project) = &failure.resource.project {
            let _ = writeln!(report, "     project: {project}");
        }
        let _ = writeln!(report, "     error: {}", failure.error);
        let _ = writeln!(
            report,
            "     attempts: {}, failed at {}",
            failure.attempts,
            failure.failed_at.to_rfc3339()
        );
    }
    report
}
