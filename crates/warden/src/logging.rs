//! Log subscriber setup for test binaries and the CLI.

use tracing_subscriber::EnvFilter;

/// Variable holding the log filter; `RUST_LOG` is used when it is unset.
pub const ENV_LOG: &str = "WARDEN_LOG";

/// Variable selecting the log format: `text` (default) or `json`.
pub const ENV_LOG_FORMAT: &str = "WARDEN_LOG_FORMAT";

/// Output format of [`init_logging`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event, for CI log collectors
    Json,
}

impl LogFormat {
    /// Format named by `value`; anything other than `json` is text.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }

    /// Format from `WARDEN_LOG_FORMAT`
    #[must_use]
    pub fn from_env() -> Self {
        Self::parse(std::env::var(ENV_LOG_FORMAT).ok().as_deref())
    }
}

/// Install a subscriber filtered by `WARDEN_LOG`/`RUST_LOG`, falling back
/// to `default_filter`, in the format given by `WARDEN_LOG_FORMAT`.
///
/// Safe to call more than once; only the first call installs anything.
/// Returns whether this call installed the subscriber.
pub fn init_logging(default_filter: &str) -> bool {
    init_logging_with(default_filter, LogFormat::from_env())
}

/// Like [`init_logging`] with an explicit format.
pub fn init_logging_with(default_filter: &str, format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_env(ENV_LOG)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    }
}

/// Like [`init_logging`] but writes through the test harness capture.
pub fn init_test_logging() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warden=debug")),
        )
        .with_test_writer()
        .try_init()
        .is_ok()
}
