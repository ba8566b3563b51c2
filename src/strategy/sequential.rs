//! Sequential processing strategy
//!
//! Streams commands with `SyncReader` and applies them one at a time, in file
//! order, on a current-thread tokio runtime. The per-user locks are still
//! taken but never contended.

use crate::core::{InMemoryPointService, PointPolicy};
use crate::io::sync_reader::SyncReader;
use crate::strategy::{write_report, OutputMode, ProcessingStrategy, ProcessingSummary};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Sequential processing strategy
///
/// # Examples
///
/// ```no_run
/// use point_ledger::core::PointPolicy;
/// use point_ledger::strategy::{OutputMode, ProcessingStrategy, SequentialProcessingStrategy};
/// use std::path::Path;
///
/// let strategy = SequentialProcessingStrategy::new(PointPolicy::default())
///     .with_output_mode(OutputMode::History);
/// let mut output = std::io::stdout();
///
/// strategy.process(Path::new("commands.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SequentialProcessingStrategy {
    policy: PointPolicy,
    output_mode: OutputMode,
}

impl SequentialProcessingStrategy {
    /// Create a sequential strategy enforcing `policy`
    pub fn new(policy: PointPolicy) -> Self {
        Self {
            policy,
            output_mode: OutputMode::default(),
        }
    }

    /// Select what the replay writes
    pub fn with_output_mode(mut self, output_mode: OutputMode) -> Self {
        self.output_mode = output_mode;
        self
    }
}

impl ProcessingStrategy for SequentialProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        let service = InMemoryPointService::in_memory(self.policy.clone());
        let reader = SyncReader::new(input_path).map_err(|e| e.to_string())?;
        let mut summary = ProcessingSummary::default();

        for row in reader {
            match row {
                Ok(command) => {
                    let outcome = runtime.block_on(service.apply(&command));
                    summary.record(&outcome);
                }
                Err(e) => {
                    summary.malformed += 1;
                    warn!("Skipping row: {}", e);
                }
            }
        }

        info!(
            applied = summary.applied,
            rejected = summary.rejected,
            timed_out = summary.timed_out,
            malformed = summary.malformed,
            "Sequential replay finished"
        );

        write_report(&service, self.output_mode, output)
    }
}
