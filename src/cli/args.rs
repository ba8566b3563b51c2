use crate::core::PointPolicy;
use crate::strategy::{BatchConfig, OutputMode};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Replay point charge/use commands and print the resulting balances
#[derive(Parser, Debug)]
#[command(name = "point-ledger")]
#[command(about = "Replay point charge/use commands and print the resulting balances", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing point commands
    #[arg(value_name = "INPUT", help = "Path to the input CSV file (type,user,amount)")]
    pub input_file: PathBuf,

    /// Processing strategy to use for replaying commands
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "concurrent",
        help = "Processing strategy: 'sequential' for file order on one thread or 'concurrent' for per-user parallelism"
    )]
    pub strategy: StrategyType,

    /// Number of commands per batch (concurrent mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of commands per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Number of runtime worker threads (concurrent mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Number of runtime worker threads (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    /// Bound on waiting for a user's lock
    #[arg(
        long = "lock-timeout-ms",
        value_name = "MILLIS",
        help = "Milliseconds a charge/use waits for the user's lock (default: 3000)"
    )]
    pub lock_timeout_ms: Option<u64>,

    /// Print every history record instead of final balances
    #[arg(
        long = "history",
        help = "Print user,id,type,amount,recorded_at for every applied command instead of final balances"
    )]
    pub history: bool,
}

/// Available replay strategies
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sequential,
    Concurrent,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values use defaults; zero values fall back to defaults with a
    /// warning (see [`BatchConfig::new`]).
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// What the replay should print
    pub fn to_output_mode(&self) -> OutputMode {
        if self.history {
            OutputMode::History
        } else {
            OutputMode::Balances
        }
    }

    /// Create the point policy from CLI arguments
    pub fn to_policy(&self) -> PointPolicy {
        match self.lock_timeout_ms {
            Some(ms) => PointPolicy::default().with_lock_timeout(Duration::from_millis(ms)),
            None => PointPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::policy::DEFAULT_LOCK_TIMEOUT;
    use rstest::rstest;

    #[rstest]
    #[case::default_strategy(&["program", "input.csv"], StrategyType::Concurrent)]
    #[case::explicit_sequential(&["program", "--strategy", "sequential", "input.csv"], StrategyType::Sequential)]
    #[case::explicit_concurrent(&["program", "--strategy", "concurrent", "input.csv"], StrategyType::Concurrent)]
    fn test_strategy_parsing(#[case] args: &[&str], #[case] expected: StrategyType) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.strategy, expected);
    }

    #[rstest]
    #[case::all_defaults(&["program", "input.csv"], 1000, num_cpus::get())]
    #[case::custom_batch_size(&["program", "--batch-size", "2000", "input.csv"], 2000, num_cpus::get())]
    #[case::custom_max_concurrent(&["program", "--max-concurrent", "8", "input.csv"], 1000, 8)]
    #[case::zero_batch_size(&["program", "--batch-size", "0", "input.csv"], 1000, num_cpus::get())]
    fn test_batch_config_conversion(
        #[case] args: &[&str],
        #[case] expected_batch_size: usize,
        #[case] expected_max_concurrent: usize,
    ) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        let config = parsed.to_batch_config();

        assert_eq!(config.batch_size, expected_batch_size);
        assert_eq!(config.max_concurrent_batches, expected_max_concurrent);
    }

    #[rstest]
    #[case::default(&["program", "input.csv"], DEFAULT_LOCK_TIMEOUT)]
    #[case::custom(&["program", "--lock-timeout-ms", "250", "input.csv"], Duration::from_millis(250))]
    #[case::zero_falls_back(&["program", "--lock-timeout-ms", "0", "input.csv"], DEFAULT_LOCK_TIMEOUT)]
    fn test_policy_conversion(#[case] args: &[&str], #[case] expected: Duration) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        let policy = parsed.to_policy();

        assert_eq!(policy.lock_timeout(), expected);
        assert_eq!(policy.max_balance(), PointPolicy::default().max_balance());
    }

    #[rstest]
    #[case::balances_by_default(&["program", "input.csv"], OutputMode::Balances)]
    #[case::history_flag(&["program", "--history", "input.csv"], OutputMode::History)]
    fn test_output_mode_conversion(#[case] args: &[&str], #[case] expected: OutputMode) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.to_output_mode(), expected);
    }

    #[rstest]
    #[case::missing_input(&["program"])]
    #[case::invalid_strategy(&["program", "--strategy", "sync", "input.csv"])]
    #[case::negative_timeout(&["program", "--lock-timeout-ms", "-1", "input.csv"])]
    #[case::history_takes_no_value(&["program", "--history=yes", "input.csv"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        assert!(CliArgs::try_parse_from(args).is_err());
    }
}
