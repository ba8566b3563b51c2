//! Synchronous CSV reader with iterator interface
//!
//! Streams point commands from a CSV file one row at a time.
//!
//! - Opening the file fails with `FileNotFound` or `IoError`
//! - A malformed row is yielded as `PointError::ParseError` carrying its line
//!   number (the header is line 1), and iteration continues with the next row
//!
//! ```no_run
//! use point_ledger::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("commands.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(command) => println!("Applying: {:?}", command),
//!         Err(e) => eprintln!("Skipping: {}", e),
//!     }
//! }
//! ```

use crate::io::csv_format::{command_from_row, CsvRecord};
use crate::types::{PointCommand, PointError};
use csv::{DeserializeRecordsIntoIter, ReaderBuilder, Trim};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

/// Synchronous CSV reader
///
/// Memory usage is constant in the size of the file.
pub struct SyncReader {
    rows: DeserializeRecordsIntoIter<File, CsvRecord>,
    rows_read: u64,
}

impl SyncReader {
    /// Open a CSV file for streaming iteration
    ///
    /// Fields are trimmed, a missing trailing amount column is tolerated and
    /// reads go through an 8KB buffer.
    pub fn new(path: &Path) -> Result<Self, PointError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PointError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => PointError::from(e),
        })?;

        let rows = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file)
            .into_deserialize::<CsvRecord>();

        Ok(Self { rows, rows_read: 0 })
    }

    /// Number of data rows consumed so far
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }
}

impl Iterator for SyncReader {
    type Item = Result<PointCommand, PointError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        self.rows_read += 1;
        Some(command_from_row(row, self.rows_read + 1))
    }
}
