//! Core business logic module
//!
//! This module contains the point ledger components:
//! - `traits` - Store abstractions the point service depends on
//! - `policy` - Amount bands, balance ceiling and lock wait bound
//! - `lock_registry` - Per-user fair mutexes with bounded acquisition
//! - `point_store` - In-memory balance table
//! - `history_store` - In-memory append-only history log
//! - `service` - Charge/use coordination under the per-user lock

pub mod history_store;
pub mod lock_registry;
pub mod point_store;
pub mod policy;
pub mod service;
pub mod traits;

pub use history_store::InMemoryHistoryStore;
pub use lock_registry::{LockRegistry, UserLockGuard};
pub use point_store::InMemoryPointStore;
pub use policy::PointPolicy;
pub use service::{InMemoryPointService, PointService};
pub use traits::{BalanceStore, HistoryStore};
