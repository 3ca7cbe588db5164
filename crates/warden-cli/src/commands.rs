//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use warden::ValidationMode;

/// Warden: inspect the user pool, check API contracts, and clean up leftover test data
#[derive(Parser, Debug)]
#[command(name = "warden")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log filter implied by `-v`/`--quiet`
    #[must_use]
    pub const fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect the test-user pool
    Pool {
        /// Pool subcommand
        #[command(subcommand)]
        command: PoolCommand,
    },

    /// Validate JSON data against a JSON Schema contract
    Contract {
        /// Contract subcommand
        #[command(subcommand)]
        command: ContractCommand,
    },

    /// Delete every resource listed in a saved ledger
    Cleanup(CleanupArgs),
}

/// `warden pool ...`
#[derive(Subcommand, Debug)]
pub enum PoolCommand {
    /// Show the pool configuration and its users
    Status(PoolStatusArgs),
}

/// `warden contract ...`
#[derive(Subcommand, Debug)]
pub enum ContractCommand {
    /// Check a JSON document against a schema
    Check(ContractCheckArgs),
}

/// Arguments for `pool status`
#[derive(Args, Debug, Default)]
pub struct PoolStatusArgs {
    /// Pool size (overrides WARDEN_POOL_SIZE)
    #[arg(long)]
    pub size: Option<usize>,

    /// Email pattern with `{n}` (overrides WARDEN_POOL_EMAIL_PATTERN)
    #[arg(long)]
    pub email_pattern: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `contract check`
#[derive(Args, Debug)]
pub struct ContractCheckArgs {
    /// JSON Schema file
    #[arg(short, long)]
    pub schema: PathBuf,

    /// JSON document to validate
    #[arg(short, long)]
    pub data: PathBuf,

    /// Contract name used in messages (defaults to the schema file stem)
    #[arg(long)]
    pub name: Option<String>,

    /// How unknown object fields are treated
    #[arg(long, value_enum, default_value = "strict")]
    pub mode: ModeArg,

    /// Context included in violation messages
    #[arg(long)]
    pub context: Option<String>,
}

/// Arguments for `cleanup`
#[derive(Args, Debug)]
pub struct CleanupArgs {
    /// Ledger file written by `CleanupTracker::save_ledger`
    #[arg(short, long)]
    pub ledger: PathBuf,

    /// API base URL (overrides WARDEN_API_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Bearer token (overrides WARDEN_API_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// Attempts per resource
    #[arg(long, default_value = "3")]
    pub attempts: u32,

    /// Delay between attempts in milliseconds
    #[arg(long, default_value = "1000")]
    pub delay_ms: u64,

    /// Write failed deletions to this file as JSON
    #[arg(long)]
    pub failures_out: Option<PathBuf>,
}

/// Validation mode argument
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModeArg {
    /// Reject undeclared fields
    #[default]
    Strict,
    /// Accept undeclared fields
    Lenient,
}

impl From<ModeArg> for ValidationMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Strict => Self::Strict,
            ModeArg::Lenient => Self::Lenient,
        }
    }
}
