//! `pool status` handler

use crate::commands::PoolStatusArgs;
use crate::error::CliResult;
use crate::output::Reporter;
use warden::{PoolConfig, UserPool};

/// Pool configuration from the environment with flag overrides applied.
///
/// # Errors
///
/// Returns an error if the environment is malformed or the pattern left
/// after the flags are applied cannot number more than one user.
pub fn pool_config(args: &PoolStatusArgs) -> CliResult<PoolConfig> {
    let mut config = PoolConfig::from_env_unvalidated()?;
    if let Some(size) = args.size {
        config = config.with_size(size);
    }
    if let Some(ref pattern) = args.email_pattern {
        config = config.with_email_pattern(pattern.clone());
    }
    config.validate()?;
    Ok(config)
}

/// Execute `pool status`
pub fn execute_pool_status(args: &PoolStatusArgs, reporter: &Reporter) -> CliResult<()> {
    let pool = UserPool::new(pool_config(args)?);

    if args.json {
        let json = serde_json::json!({
            "status": pool.status(),
            "users": pool.users(),
        });
        reporter.line(&serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    reporter.header("User pool");
    reporter.line(&render_pool_table(&pool));
    Ok(())
}

/// One line per user plus an occupancy footer
#[must_use]
pub fn render_pool_table(pool: &UserPool) -> String {
    let mut out = String::new();
    for user in pool.users() {
        let state = user.owner.as_deref().unwrap_or("available");
        out.push_str(&format!("  {:<10} {:<36} {state}\n", user.id, user.email));
    }
    let status = pool.status();
    out.push_str(&format!(
        "{} total, {} available, {} in use",
        status.total, status.available, status.in_use
    ));
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = PoolStatusArgs {
            size: Some(2),
            email_pattern: Some("qa{n}@corp.test".to_string()),
            json: false,
        };
        let config = pool_config(&args).unwrap();
        assert_eq!(config.size, 2);
        assert_eq!(config.email_for(2), "qa2@corp.test");
    }

    #[test]
    fn test_pattern_without_placeholder_is_rejected() {
        let args = PoolStatusArgs {
            size: Some(3),
            email_pattern: Some("fixed@corp.test".to_string()),
            json: false,
        };
        assert!(pool_config(&args).is_err());
    }

    #[test]
    fn test_table_shows_owner_and_footer() {
        let pool = UserPool::new(PoolConfig::new().with_size(2));
        pool.acquire("worker-7").unwrap();

        let table = render_pool_table(&pool);

        assert!(table.contains("user-1"));
        assert!(table.contains("worker-7"));
        assert!(table.contains("testuser2@example.com"));
        assert!(table.ends_with("2 total, 1 available, 1 in use"));
    }
}
