//! Concurrent batch processing strategy
//!
//! Reads commands in batches with `AsyncReader` and applies each batch through
//! a `BatchProcessor` on a multi-threaded tokio runtime.
//!
//! # Architecture
//!
//! ```text
//! ConcurrentProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── BatchProcessor (user partitioning + one task per user)
//!     └── InMemoryPointService
//!         ├── InMemoryPointStore
//!         ├── InMemoryHistoryStore
//!         └── LockRegistry
//! ```
//!
//! Batches are processed one after another so a user whose commands span two
//! batches still sees them in file order.

use crate::core::{InMemoryPointService, PointPolicy};
use crate::io::async_reader::AsyncReader;
use crate::strategy::{
    write_report, BatchProcessor, OutputMode, ProcessingStrategy, ProcessingSummary,
};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Configuration for batch processing
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of commands per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "Invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                max_concurrent_batches,
                default = default.max_concurrent_batches,
                "Invalid max_concurrent_batches, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Concurrent batch processing strategy
#[derive(Debug, Clone)]
pub struct ConcurrentProcessingStrategy {
    config: BatchConfig,
    policy: PointPolicy,
    output_mode: OutputMode,
}

impl ConcurrentProcessingStrategy {
    /// Create a new ConcurrentProcessingStrategy
    pub fn new(config: BatchConfig, policy: PointPolicy) -> Self {
        Self {
            config,
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

impl ProcessingStrategy for ConcurrentProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .enable_all()
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let service = InMemoryPointService::in_memory(self.policy.clone());
            let processor = BatchProcessor::new(service.clone());

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);
            let mut summary = ProcessingSummary::default();

            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                for result in processor.process_batch(batch).await? {
                    summary.record(&result.result);
                }
            }
            summary.malformed = reader.skipped();

            info!(
                applied = summary.applied,
                rejected = summary.rejected,
                timed_out = summary.timed_out,
                malformed = summary.malformed,
                users = service.balance_store().len(),
                "Concurrent replay finished"
            );

            write_report(&service, self.output_mode, output)
        })
    }
}
