//! Asynchronous CSV reader with batch interface
//!
//! Feeds the concurrent replay strategy. Rows go through the same
//! `command_from_row` conversion as the synchronous reader, so a malformed row
//! is reported with the same line number and message by both.
//!
//! ```text
//! csv-async deserializer ──► command_from_row ──► batch of PointCommands
//!                                   │
//!                                   └──► warn! + skipped count
//! ```

use crate::io::csv_format::{command_from_row, CsvRecord};
use crate::types::PointCommand;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

/// Asynchronous CSV reader
///
/// Holds at most one batch of commands in memory.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    rows_read: u64,
    skipped: usize,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            rows_read: 0,
            skipped: 0,
        }
    }

    /// Read up to `batch_size` commands
    ///
    /// Malformed rows are logged, counted in [`Self::skipped`] and left out of
    /// the batch. An empty vector means the input is exhausted.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<PointCommand> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut rows = self.csv_reader.deserialize::<CsvRecord>();

        while batch.len() < batch_size {
            let Some(row) = rows.next().await else {
                break;
            };
            self.rows_read += 1;

            match command_from_row(row, self.rows_read + 1) {
                Ok(command) => batch.push(command),
                Err(e) => {
                    self.skipped += 1;
                    warn!("Skipping row: {}", e);
                }
            }
        }

        batch
    }

    /// Malformed rows skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
