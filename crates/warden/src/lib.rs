//! Warden: test-resource lifecycle for end-to-end and API test suites
//!
//! Three pieces of bookkeeping that keep parallel UI/API tests from stepping
//! on each other and from leaving junk behind in the system under test:
//!
//! - [`UserPool`]: hands out pre-seeded test accounts, one worker at a time.
//! - [`CleanupTracker`]: records what a test created and deletes it at
//!   teardown, newest first, retrying flaky deletions and reporting the ones
//!   that never succeed.
//! - [`ContractValidator`]: checks API responses against JSON Schema
//!   contracts and keeps a pass rate for the run.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     WARDEN Lifecycle                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ UserPool   │───►│ Test body  │───►│ Cleanup    │            │
//! │   │ (acquire)  │    │ + Seeder   │    │ Tracker    │            │
//! │   └────────────┘    └─────┬──────┘    └─────┬──────┘            │
//! │         ▲                 │ track           │ DELETE / UI       │
//! │         └──── release ────┴─────────────────┘                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use warden::{current_worker_id, HttpApiContext, NoUi, ResourceScope, UserPool};
//!
//! let pool = Arc::new(UserPool::from_env()?);
//! let api = HttpApiContext::from_env()?;
//! let outcome = ResourceScope::new(api, NoUi)
//!     .with_user(pool, current_worker_id())
//!     .run(|ctx| async move { /* create, track, assert */ })
//!     .await?;
//! assert!(outcome.failures.is_empty());
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod api;
mod config;
mod contract;
mod logging;
mod pool;
mod resource;
mod result;
mod retry;
mod scope;
mod seed;
mod tracker;

pub use api::{ApiContext, ApiResponse};
#[cfg(feature = "http")]
pub use api::HttpApiContext;
pub use config::{
    current_worker_id, ApiConfig, PoolConfig, ENV_API_BASE_URL, ENV_API_TOKEN,
    ENV_POOL_EMAIL_PATTERN, ENV_POOL_PASSWORD, ENV_POOL_SIZE, ENV_WORKER_ID,
    USER_NUMBER_PLACEHOLDER,
};
pub use contract::{
    Contract, ContractStats, ContractValidator, ContractViolation, FieldError, SafeParse,
    ValidationMode,
};
pub use logging::{
    init_logging, init_logging_with, init_test_logging, LogFormat, ENV_LOG, ENV_LOG_FORMAT,
};
pub use pool::{reset_user_pool, user_pool, user_pool_with, PoolStatus, PoolUser, PooledUser, UserPool};
pub use resource::{DeletionMethod, FailedCleanup, HttpVerb, ResourceKey, TrackedResource};
pub use result::{WardenError, WardenResult};
pub use retry::{Retried, RetryExhausted, RetryPolicy};
pub use scope::{ResourceScope, ScopeContext, ScopeOutcome, TrackerHandle};
pub use seed::ApiSeeder;
pub use tracker::{CleanupSummary, CleanupTracker, NoUi, UiDeleter};

/// Prelude for test files
pub mod prelude {
    pub use super::{
        current_worker_id, ApiContext, CleanupTracker, Contract, ContractValidator, NoUi,
        PoolConfig, ResourceScope, RetryPolicy, TrackedResource, UiDeleter, UserPool, WardenError,
        WardenResult,
    };
    #[cfg(feature = "http")]
    pub use super::HttpApiContext;
}
