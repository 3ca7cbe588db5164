//! Warden CLI
//!
//! ## Usage
//!
//! ```bash
//! warden pool status --size 4               # Show pool users
//! warden contract check -s deck.json -d r.json
//! warden cleanup --ledger leftovers.json    # Delete leftover test data
//! ```

use clap::Parser;
use std::process::ExitCode;
use warden_cli::{
    handlers::{execute_cleanup, execute_contract_check, execute_pool_status},
    Cli, CliResult, Commands, ContractCommand, PoolCommand, Reporter,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    warden::init_logging(cli.log_filter());
    let reporter = Reporter::new(console::colors_enabled(), cli.quiet);

    match cli.command {
        Commands::Pool {
            command: PoolCommand::Status(args),
        } => execute_pool_status(&args, &reporter),
        Commands::Contract {
            command: ContractCommand::Check(args),
        } => execute_contract_check(&args, &reporter),
        Commands::Cleanup(args) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(execute_cleanup(&args, &reporter))
        }
    }
}
