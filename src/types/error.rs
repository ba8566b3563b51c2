//! Error types for the point ledger
//!
//! This module defines all error types that can occur while charging, using
//! and querying point balances, plus the I/O and parse errors of the CSV
//! replay front end.
//!
//! # Error Categories
//!
//! - **Business rule rejections**: invalid amount, balance ceiling, insufficient
//!   balance. Deterministic: retrying the same request gives the same answer.
//! - **Contention**: lock timeout. Retryable; nothing was mutated.
//! - **Store failures**: a balance or history store call failed, or returned a
//!   balance so large that applying the request overflows.
//! - **File I/O and CSV errors**: raised by the replay CLI only.

use super::history::TransactionType;
use super::point::{Points, UserId};
use thiserror::Error;

/// Main error type for the point ledger
///
/// Every failure is reported through this enum; no operation returns a
/// balance together with a failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PointError {
    /// Requested amount is zero, negative, or outside the `[min, max]` band
    /// of the operation
    ///
    /// Rejected before the user's lock is taken.
    #[error("Invalid {kind} amount {amount}: must be between {min} and {max}")]
    InvalidAmount {
        /// Operation the amount was requested for
        kind: TransactionType,
        /// The rejected amount
        amount: Points,
        /// Inclusive lower bound
        min: Points,
        /// Inclusive upper bound
        max: Points,
    },

    /// A charge would push the balance above the configured ceiling
    #[error("Balance ceiling exceeded for user {user}: current {current}, requested {requested}, max {max}")]
    BalanceCeilingExceeded {
        /// User ID
        user: UserId,
        /// Balance at the time of the check
        current: Points,
        /// Requested charge amount
        requested: Points,
        /// Configured ceiling
        max: Points,
    },

    /// A use requested more points than the user holds
    #[error("Insufficient balance for user {user}: available {available}, requested {requested}")]
    InsufficientBalance {
        /// User ID
        user: UserId,
        /// Balance at the time of the check
        available: Points,
        /// Requested use amount
        requested: Points,
    },

    /// The user's lock could not be acquired within the configured wait
    ///
    /// Signals contention, not a rejection: the request may succeed if
    /// retried.
    #[error("Timed out after {waited_ms}ms waiting for the lock of user {user}, retry the request")]
    LockTimeout {
        /// User ID
        user: UserId,
        /// How long the caller waited
        waited_ms: u64,
    },

    /// The new balance does not fit in `Points`
    ///
    /// `PointPolicy` keeps every limit at or below half of `Points::MAX`, so
    /// this only surfaces when a balance store returns a corrupt balance far
    /// above the ceiling. Not retryable: the stored row needs repair.
    #[error("Arithmetic overflow in {operation} for user {user}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// User ID
        user: UserId,
    },

    /// A balance or history store call failed
    #[error("{store} store failure: {message}")]
    StoreFailure {
        /// Which store failed ("balance" or "history")
        store: String,
        /// Description of the failure
        message: String,
    },

    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

impl From<std::io::Error> for PointError {
    fn from(error: std::io::Error) -> Self {
        PointError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for PointError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        PointError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl PointError {
    /// Create an InvalidAmount error
    pub fn invalid_amount(kind: TransactionType, amount: Points, min: Points, max: Points) -> Self {
        PointError::InvalidAmount {
            kind,
            amount,
            min,
            max,
        }
    }

    /// Create a BalanceCeilingExceeded error
    pub fn balance_ceiling_exceeded(
        user: UserId,
        current: Points,
        requested: Points,
        max: Points,
    ) -> Self {
        PointError::BalanceCeilingExceeded {
            user,
            current,
            requested,
            max,
        }
    }

    /// Create an InsufficientBalance error
    pub fn insufficient_balance(user: UserId, available: Points, requested: Points) -> Self {
        PointError::InsufficientBalance {
            user,
            available,
            requested,
        }
    }

    /// Create a LockTimeout error
    pub fn lock_timeout(user: UserId, waited_ms: u64) -> Self {
        PointError::LockTimeout { user, waited_ms }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, user: UserId) -> Self {
        PointError::ArithmeticOverflow {
            operation: operation.to_string(),
            user,
        }
    }

    /// Create a StoreFailure error
    pub fn store_failure(store: &str, message: impl Into<String>) -> Self {
        PointError::StoreFailure {
            store: store.to_string(),
            message: message.into(),
        }
    }

    /// Whether the same request may succeed if simply retried
    ///
    /// Only lock contention qualifies. Business rule rejections are
    /// deterministic and store failures need operator attention.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PointError::LockTimeout { .. })
    }
}
