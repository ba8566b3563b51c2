//! Point Ledger Library
//! # Overview
//!
//! This library keeps per-user point balances and serializes every charge and
//! use of a user behind that user's own lock, while different users proceed in
//! parallel.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (UserPoint, PointHistory, PointError, etc.)
//! - [`core`] - Business logic components:
//!   - [`core::service`] - Charge/use coordination under the per-user lock
//!   - [`core::lock_registry`] - Lazily created per-user fair mutexes
//!   - [`core::policy`] - Amount bands, balance ceiling, lock wait bound
//!   - [`core::point_store`] / [`core::history_store`] - In-memory stores
//! - [`io`] - CSV command input and balance output
//! - [`strategy`] - Sequential and concurrent CSV replay pipelines
//! - [`cli`] - CLI arguments parsing
//! - [`telemetry`] - Logging setup
//!
//! # Rules
//!
//! - **Charge**: 1,000 to 100,000 points per request; the balance may not
//!   exceed 1,000,000
//! - **Use**: 1,000 to 500,000 points per request; the balance may not go
//!   below zero
//! - A charge or use waits at most 3 seconds for the user's lock and then
//!   fails with a retryable `LockTimeout`
//!
//! # Example
//!
//! ```no_run
//! use point_ledger::core::{InMemoryPointService, PointPolicy};
//!
//! # async fn run() -> Result<(), point_ledger::PointError> {
//! let service = InMemoryPointService::in_memory(PointPolicy::default());
//! service.charge(1, 10_000).await?;
//! let balance = service.use_points(1, 2_500).await?;
//! assert_eq!(balance.point, 7_500);
//! assert_eq!(service.get_history(1)?.len(), 2);
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod telemetry;
pub mod types;

pub use core::{
    BalanceStore, HistoryStore, InMemoryHistoryStore, InMemoryPointService, InMemoryPointStore,
    LockRegistry, PointPolicy, PointService,
};
pub use io::write_balances_csv;
pub use types::{
    HistoryId, PointCommand, PointError, PointHistory, Points, TransactionType, UserId, UserPoint,
};
