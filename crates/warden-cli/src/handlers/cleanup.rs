//! `cleanup` handler: replay a saved ledger over HTTP

use crate::commands::CleanupArgs;
use crate::error::{CliError, CliResult};
use crate::output::Reporter;
use std::time::Duration;
use tracing::info;
use warden::{ApiConfig, CleanupTracker, HttpApiContext, NoUi, RetryPolicy};

/// Retry policy from `--attempts` and `--delay-ms`
#[must_use]
pub fn retry_policy(args: &CleanupArgs) -> RetryPolicy {
    RetryPolicy::new(args.attempts).with_delay(Duration::from_millis(args.delay_ms))
}

fn api_config(args: &CleanupArgs) -> ApiConfig {
    let mut config = ApiConfig::from_env();
    if let Some(ref url) = args.base_url {
        config.base_url.clone_from(url);
    }
    if let Some(ref token) = args.token {
        config.token = Some(token.clone());
    }
    config
}

/// Execute `cleanup`.
///
/// UI-method entries cannot be deleted without a browser and are reported
/// as failures.
///
/// # Errors
///
/// Returns [`CliError::CleanupIncomplete`] if any resource is left behind.
pub async fn execute_cleanup(args: &CleanupArgs, reporter: &Reporter) -> CliResult<()> {
    let mut tracker = CleanupTracker::with_policy(retry_policy(args));
    let loaded = tracker.load_ledger(&args.ledger)?;
    if loaded == 0 {
        reporter.success("Ledger is empty, nothing to clean up");
        return Ok(());
    }

    let config = api_config(args);
    info!(base_url = %config.base_url, resources = loaded, "replaying ledger");
    let api = HttpApiContext::new(&config)?;

    let summary = tracker.cleanup(&NoUi, &api).await;

    if summary.is_clean() {
        reporter.success(&format!(
            "Deleted {} of {} resource(s)",
            summary.deleted, summary.attempted
        ));
        return Ok(());
    }

    reporter.failure(&format!(
        "Deleted {} of {} resource(s)",
        summary.deleted, summary.attempted
    ));
    reporter.detail(&tracker.failure_report());
    if let Some(ref path) = args.failures_out {
        std::fs::write(path, serde_json::to_string_pretty(tracker.failures())?)?;
    }
    Err(CliError::CleanupIncomplete {
        failed: summary.failed,
    })
}
