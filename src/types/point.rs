//! Balance-related types for the point ledger
//!
//! This module defines the `UserPoint` structure holding a user's current
//! point balance together with the time it was last written.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// User identifier
pub type UserId = u64;

/// Point amount
///
/// Signed so that a negative requested amount can reach validation and be
/// rejected as an invalid amount instead of failing to parse.
pub type Points = i64;

/// Current point balance of a single user
///
/// Invariant: `0 <= point <= max_balance` of the policy the balance was
/// written under. Only the point service mutates balances, and only while it
/// holds the owning user's lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPoint {
    /// The user this balance belongs to
    pub id: UserId,

    /// Current point balance
    pub point: Points,

    /// Time of the last write to this balance
    ///
    /// For a user that was never written this is the time of the read that
    /// produced the empty balance.
    pub updated_at: DateTime<Utc>,
}

impl UserPoint {
    /// Create an empty balance for a user that has no stored row yet
    ///
    /// # Arguments
    ///
    /// * `id` - The user ID for this balance
    ///
    /// # Returns
    ///
    /// A `UserPoint` with `point = 0` stamped with the current time
    pub fn empty(id: UserId) -> Self {
        Self::new(id, 0)
    }

    /// Create a balance snapshot stamped with the current time
    pub fn new(id: UserId, point: Points) -> Self {
        UserPoint {
            id,
            point,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_balance_has_zero_points() {
        let before = Utc::now();
        let balance = UserPoint::empty(7);

        assert_eq!(balance.id, 7);
        assert_eq!(balance.point, 0);
        assert!(balance.updated_at >= before);
    }
}
