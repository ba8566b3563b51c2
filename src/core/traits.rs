//! Storage traits consumed by the point service
//!
//! The balance table and the history log are collaborators of the point
//! service, not part of it. These traits describe exactly what the service
//! relies on: each call is atomic on its own, and nothing is promised across
//! calls. Composing calls correctly is the service's job, done under the
//! per-user lock.

use crate::types::{PointError, PointHistory, Points, TransactionType, UserId, UserPoint};
use chrono::{DateTime, Utc};

/// Per-user balance table
///
/// Implementations must be safe to share across threads; the point service
/// keeps them behind an `Arc` and calls them from many tasks at once.
pub trait BalanceStore: Send + Sync {
    /// Read the balance of a user
    ///
    /// A user without a stored row reads as [`UserPoint::empty`].
    fn read(&self, user: UserId) -> Result<UserPoint, PointError>;

    /// Overwrite the balance of a user and return the stored snapshot
    ///
    /// The returned snapshot carries a fresh `updated_at`.
    fn write(&self, user: UserId, point: Points) -> Result<UserPoint, PointError>;
}

/// Append-only transaction history
pub trait HistoryStore: Send + Sync {
    /// Append a record for a committed balance mutation
    fn append(
        &self,
        user: UserId,
        kind: TransactionType,
        amount: Points,
        recorded_at: DateTime<Utc>,
    ) -> Result<PointHistory, PointError>;

    /// All records of a user in insertion order (empty if none)
    fn list_by_user(&self, user: UserId) -> Result<Vec<PointHistory>, PointError>;
}
