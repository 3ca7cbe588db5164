//! Environment-driven configuration.
//!
//! Every setting has a default, may be overridden by a `WARDEN_*` variable,
//! and may be overridden again in code through the builder methods.

use crate::result::{WardenError, WardenResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pool size variable
pub const ENV_POOL_SIZE: &str = "WARDEN_POOL_SIZE";
/// Email pattern variable (must contain `{n}`)
pub const ENV_POOL_EMAIL_PATTERN: &str = "WARDEN_POOL_EMAIL_PATTERN";
/// Shared password variable
pub const ENV_POOL_PASSWORD: &str = "WARDEN_POOL_PASSWORD";
/// Worker identity variable
pub const ENV_WORKER_ID: &str = "WARDEN_WORKER_ID";
/// API base URL variable
pub const ENV_API_BASE_URL: &str = "WARDEN_API_BASE_URL";
/// API bearer token variable
pub const ENV_API_TOKEN: &str = "WARDEN_API_TOKEN";

/// Placeholder replaced by the 1-based user number in email patterns.
pub const USER_NUMBER_PLACEHOLDER: &str = "{n}";

/// User pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of users in the pool
    pub size: usize,
    /// Email pattern with a `{n}` placeholder
    pub email_pattern: String,
    /// Password shared by every pool user
    pub password: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            size: 10,
            email_pattern: "testuser{n}@example.com".to_string(),
            password: "TestPassword123!".to_string(),
        }
    }
}

impl PoolConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from the environment on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but malformed.
    pub fn from_env() -> WardenResult<Self> {
        let config = Self::from_env_unvalidated()?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`PoolConfig::from_env`] without the final [`PoolConfig::validate`],
    /// for callers that apply further overrides first.
    ///
    /// # Errors
    ///
    /// Returns an error if `WARDEN_POOL_SIZE` is not a number.
    pub fn from_env_unvalidated() -> WardenResult<Self> {
        let mut config = Self::default();
        if let Some(size) = env_var(ENV_POOL_SIZE) {
            config.size = size.parse().map_err(|_| {
                WardenError::config(format!("{ENV_POOL_SIZE} must be a number, got '{size}'"))
            })?;
        }
        if let Some(pattern) = env_var(ENV_POOL_EMAIL_PATTERN) {
            config.email_pattern = pattern;
        }
        if let Some(password) = env_var(ENV_POOL_PASSWORD) {
            config.password = password;
        }
        Ok(config)
    }

    /// Set the pool size
    #[must_use]
    pub const fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Set the email pattern
    #[must_use]
    pub fn with_email_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.email_pattern = pattern.into();
        self
    }

    /// Set the shared password
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Check that the pattern can produce distinct emails.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern has no `{n}` placeholder.
    pub fn validate(&self) -> WardenResult<()> {
        if self.size > 1 && !self.email_pattern.contains(USER_NUMBER_PLACEHOLDER) {
            return Err(WardenError::config(format!(
                "email pattern '{}' must contain {USER_NUMBER_PLACEHOLDER}",
                self.email_pattern
            )));
        }
        Ok(())
    }

    /// Email for the user with the given 1-based number
    #[must_use]
    pub fn email_for(&self, n: usize) -> String {
        self.email_pattern
            .replace(USER_NUMBER_PLACEHOLDER, &n.to_string())
    }
}

/// API connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL requests are resolved against
    pub base_url: String,
    /// Optional bearer token sent with every request
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ApiConfig {
    /// Create a configuration for the given base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Read `WARDEN_API_BASE_URL` and `WARDEN_API_TOKEN`
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(url) = env_var(ENV_API_BASE_URL) {
            config.base_url = url;
        }
        config.token = env_var(ENV_API_TOKEN);
        config
    }

    /// Set the bearer token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Identity of the current worker.
///
/// Uses `WARDEN_WORKER_ID` when the runner exports one, otherwise the
/// process id, since each worker is its own process.
#[must_use]
pub fn current_worker_id() -> String {
    env_var(ENV_WORKER_ID).unwrap_or_else(|| format!("worker-{}", std::process::id()))
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
