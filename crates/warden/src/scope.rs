//! Scoped test lifecycle.
//!
//! [`ResourceScope::run`] gives a test body a tracker (and optionally a pool
//! user), then cleans up on every exit path: normal return, returned error,
//! or panic. A panic is re-raised only after cleanup has run, so the next
//! test never starts on top of leftovers.

use crate::api::ApiContext;
use crate::pool::{PoolUser, PooledUser, UserPool};
use crate::resource::{FailedCleanup, TrackedResource};
use crate::result::WardenResult;
use crate::retry::RetryPolicy;
use crate::tracker::{CleanupSummary, CleanupTracker, UiDeleter};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{error, info};

/// Shared handle to a test's [`CleanupTracker`].
///
/// Clones point at the same ledger, so page objects and seeders can each
/// hold one.
#[derive(Debug, Clone, Default)]
pub struct TrackerHandle {
    inner: Arc<Mutex<CleanupTracker>>,
}

impl TrackerHandle {
    /// Wrap a tracker
    #[must_use]
    pub fn new(tracker: CleanupTracker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tracker)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CleanupTracker> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a resource
    pub fn track(&self, resource: TrackedResource) {
        self.lock().track(resource);
    }

    /// Snapshot of pending resources
    #[must_use]
    pub fn all(&self) -> Vec<TrackedResource> {
        self.lock().all().to_vec()
    }

    /// Number of pending resources
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is pending
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forget pending resources without deleting them
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Take the tracker out, leaving an empty one with the same policy.
    ///
    /// Cleanup awaits network calls, so it runs on an owned tracker rather
    /// than under the lock.
    #[must_use]
    pub fn take(&self) -> CleanupTracker {
        let mut guard = self.lock();
        let policy = *guard.policy();
        std::mem::replace(&mut *guard, CleanupTracker::with_policy(policy))
    }
}

/// What a test body receives from [`ResourceScope::run`]
#[derive(Debug, Clone)]
pub struct ScopeContext {
    /// Ledger for resources the test creates
    pub tracker: TrackerHandle,
    /// Pool user held for the duration of the test
    pub user: Option<PoolUser>,
}

/// Result of a scoped test
#[derive(Debug)]
pub struct ScopeOutcome<T> {
    /// What the body returned
    pub value: T,
    /// Counts from the cleanup pass
    pub summary: CleanupSummary,
    /// Resources that could not be deleted
    pub failures: Vec<FailedCleanup>,
}

impl<T> ScopeOutcome<T> {
    /// The body's value, or the first cleanup failure as an error
    ///
    /// # Errors
    ///
    /// Returns [`crate::WardenError::CleanupDeleteFailed`] if any deletion failed.
    pub fn into_result(self) -> WardenResult<T> {
        match self.failures.first() {
            Some(failure) => Err(failure.to_error()),
            None => Ok(self.value),
        }
    }
}

/// Test lifecycle: optional pool user plus guaranteed cleanup.
///
/// # Example
///
/// ```ignore
/// let scope = ResourceScope::new(api, page).with_user(pool, &current_worker_id());
/// let outcome = scope
///     .run(|ctx| async move {
///         let deck = create_deck(&ctx).await;
///         ctx.tracker.track(TrackedResource::api("deck", &deck.id, &deck.name, format!("/decks/{}", deck.id)));
///         assert_eq!(deck.cards.len(), 0);
///     })
///     .await?;
/// ```
#[derive(Debug)]
pub struct ResourceScope<A, U> {
    api: A,
    ui: U,
    policy: RetryPolicy,
    user: Option<(Arc<UserPool>, String)>,
}

impl<A, U> ResourceScope<A, U>
where
    A: ApiContext,
    U: UiDeleter,
{
    /// Scope deleting through `api` and `ui`
    pub fn new(api: A, ui: U) -> Self {
        Self {
            api,
            ui,
            policy: RetryPolicy::default(),
            user: None,
        }
    }

    /// Retry policy for the cleanup pass
    #[must_use]
    pub const fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Hold a user from `pool` for `worker_id` while the body runs
    #[must_use]
    pub fn with_user(mut self, pool: Arc<UserPool>, worker_id: impl Into<String>) -> Self {
        self.user = Some((pool, worker_id.into()));
        self
    }

    /// Run `body`, then clean up.
    ///
    /// # Errors
    ///
    /// Returns [`crate::WardenError::PoolExhausted`] before the body runs if a user
    /// was requested and none is free. Cleanup failures are reported in the
    /// outcome, never as errors.
    ///
    /// # Panics
    ///
    /// Re-raises a panic from `body` after cleanup has finished.
    pub async fn run<F, Fut, T>(self, body: F) -> WardenResult<ScopeOutcome<T>>
    where
        F: FnOnce(ScopeContext) -> Fut,
        Fut: Future<Output = T>,
    {
        let held: Option<PooledUser> = match &self.user {
            Some((pool, worker)) => Some(pool.acquire_guard(worker)?),
            None => None,
        };

        let tracker = TrackerHandle::new(CleanupTracker::with_policy(self.policy));
        let ctx = ScopeContext {
            tracker: tracker.clone(),
            user: held.as_ref().map(|h| h.user().clone()),
        };

        let result = AssertUnwindSafe(body(ctx)).catch_unwind().await;

        let mut ledger = tracker.take();
        let summary = ledger.cleanup(&self.ui, &self.api).await;
        if ledger.has_failures() {
            error!("{}", ledger.failure_report());
        } else if summary.attempted > 0 {
            info!(deleted = summary.deleted, "scope cleaned up");
        }
        drop(held);

        match result {
            Ok(value) => Ok(ScopeOutcome {
                value,
                summary,
                failures: ledger.failures().to_vec(),
            }),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}
