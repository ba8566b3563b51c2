//! Processing strategy module for CSV command replay
//!
//! A strategy covers the whole replay pipeline: reading point commands from a
//! CSV file, applying them through a `PointService`, and writing either the
//! final balances or the full history. Implementations are selected at runtime
//! from the CLI.

use crate::cli::StrategyType;
use crate::core::{InMemoryPointService, PointPolicy};
use crate::io::csv_format::{write_balances_csv, write_history_csv};
use crate::types::{PointError, UserId, UserPoint};
use std::io::Write;
use std::path::Path;

pub mod batch_processor;
pub mod concurrent;
pub mod sequential;

pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use concurrent::{BatchConfig, ConcurrentProcessingStrategy};
pub use sequential::SequentialProcessingStrategy;

/// Processing strategy trait for complete replay pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Replay commands from `input_path` and write the report to `output`
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the file was replayed (rejected commands included)
    /// * `Err(String)` if a fatal error occurred (file not found, runtime
    ///   creation failed, replay task panicked, output not writable)
    ///
    /// Rejected or malformed commands are logged and do not stop the replay.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// What a replay writes once every command has been applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// `user,point` for every user with a balance row
    #[default]
    Balances,
    /// `user,id,type,amount,recorded_at` for every history record
    History,
}

/// Write the report selected by `mode` for a finished replay
///
/// Every committed mutation writes a balance row, so the users with a
/// balance row are exactly the users with history.
pub fn write_report(
    service: &InMemoryPointService,
    mode: OutputMode,
    output: &mut dyn Write,
) -> Result<(), String> {
    let balances = service.balance_store().snapshot();

    match mode {
        OutputMode::Balances => write_balances_csv(&balances, output),
        OutputMode::History => {
            let mut users: Vec<UserId> = balances.iter().map(|balance| balance.id).collect();
            users.sort_unstable();

            let mut records = Vec::new();
            for user in users {
                let history = service
                    .get_history(user)
                    .map_err(|e| format!("Failed to read history of user {}: {}", user, e))?;
                records.extend(history);
            }

            write_history_csv(&records, output)
        }
    }
}

/// Outcome counters of a replay
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingSummary {
    /// Commands that changed a balance
    pub applied: usize,
    /// Commands refused by a business rule or a store failure
    pub rejected: usize,
    /// Commands that timed out on the user's lock
    pub timed_out: usize,
    /// Rows that could not be turned into a command
    pub malformed: usize,
}

impl ProcessingSummary {
    /// Count one command outcome
    pub fn record(&mut self, result: &Result<UserPoint, PointError>) {
        match result {
            Ok(_) => self.applied += 1,
            Err(e) if e.is_retryable() => self.timed_out += 1,
            Err(_) => self.rejected += 1,
        }
    }
}

/// Create a processing strategy based on the specified strategy type
///
/// `config` is only used by the concurrent strategy; `None` means defaults.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
    policy: PointPolicy,
    output_mode: OutputMode,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sequential => {
            Box::new(SequentialProcessingStrategy::new(policy).with_output_mode(output_mode))
        }
        StrategyType::Concurrent => {
            let config = config.unwrap_or_default();
            Box::new(
                ConcurrentProcessingStrategy::new(config, policy).with_output_mode(output_mode),
            )
        }
    }
}
