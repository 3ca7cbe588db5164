//! Warden CLI library
//!
//! Command-line front end for the `warden` crate: user-pool diagnostics,
//! one-off contract checks, and replaying cleanup ledgers left behind by
//! crashed test runs.

#![warn(missing_docs)]
#![allow(clippy::format_push_string)]

mod commands;
mod error;
pub mod handlers;
mod output;

pub use commands::{
    CleanupArgs, Cli, Commands, ContractCheckArgs, ContractCommand, ModeArg, PoolCommand,
    PoolStatusArgs,
};
pub use error::{CliError, CliResult};
pub use output::Reporter;
