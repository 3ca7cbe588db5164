//! Command handlers
//!
//! Each handler takes its parsed arguments and a [`Reporter`](crate::Reporter)
//! and returns an error when the command should exit non-zero.

pub mod cleanup;
pub mod contract;
pub mod pool;

pub use cleanup::{execute_cleanup, retry_policy};
pub use contract::{execute_contract_check, load_contract};
pub use pool::{execute_pool_status, pool_config, render_pool_table};
