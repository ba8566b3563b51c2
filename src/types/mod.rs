//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `point`: Balance type and identifiers
//! - `history`: Transaction kinds, history records and replay commands
//! - `error`: Error types for the point ledger

pub mod error;
pub mod history;
pub mod point;

pub use error::PointError;
pub use history::{HistoryId, PointCommand, PointHistory, TransactionType};
pub use point::{Points, UserId, UserPoint};
