//! Point Ledger CLI
//!
//! Replays point charge/use commands from a CSV file and prints the final
//! balance of every user, or with `--history` every applied command, to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- commands.csv > balances.csv
//! cargo run -- --strategy sequential commands.csv > balances.csv
//! cargo run -- --strategy concurrent --batch-size 2000 --max-concurrent 8 commands.csv
//! RUST_LOG=debug cargo run -- --lock-timeout-ms 500 commands.csv
//! cargo run -- --history commands.csv > history.csv
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use point_ledger::cli;
use point_ledger::strategy;
use point_ledger::telemetry;
use std::process;

fn main() {
    let args = cli::parse_args();

    if let Err(e) = telemetry::init_logging() {
        eprintln!("Warning: {}", e);
    }

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Concurrent) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(
            args.strategy.clone(),
            config,
            args.to_policy(),
            args.to_output_mode(),
        )
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
