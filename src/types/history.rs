//! Transaction-related types for the point ledger
//!
//! This module defines the transaction kinds, the immutable history records
//! appended after every successful balance mutation, and the command type the
//! CSV replay pipeline feeds into the point service.

use super::point::{Points, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// History record identifier
///
/// Assigned by the history store from a store-wide increasing sequence.
pub type HistoryId = u64;

/// Kinds of balance mutation recorded in the history log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Points added to a balance
    Charge,

    /// Points spent from a balance
    Use,
}

impl TransactionType {
    /// Lowercase name used in CSV input and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Charge => "charge",
            TransactionType::Use => "use",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only history entry
///
/// `amount` is the requested amount of the operation, not the resulting
/// balance. Records are never modified after the store hands them out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointHistory {
    /// Store-assigned sequence number
    pub id: HistoryId,

    /// The user whose balance was mutated
    pub user_id: UserId,

    /// Whether the mutation was a charge or a use
    pub kind: TransactionType,

    /// Requested amount of the operation (always positive)
    pub amount: Points,

    /// Time the mutation was committed
    pub recorded_at: DateTime<Utc>,
}

/// A single charge/use request as read from CSV input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointCommand {
    /// Charge or use
    pub kind: TransactionType,

    /// The user the command targets
    pub user: UserId,

    /// Requested amount, validated later by the point service
    pub amount: Points,
}
