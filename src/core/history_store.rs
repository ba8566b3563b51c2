//! Thread-safe in-memory history log
//!
//! `InMemoryHistoryStore` keeps one append-only vector of [`PointHistory`]
//! per user in a `DashMap`, and assigns record IDs from a store-wide atomic
//! sequence.
//!
//! Appends for a single user come from the point service while it holds that
//! user's lock, so per-user insertion order is the order in which the lock
//! admitted the mutations.

use crate::core::traits::HistoryStore;
use crate::types::{HistoryId, PointError, PointHistory, Points, TransactionType, UserId};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory history log backed by `DashMap`
#[derive(Debug)]
pub struct InMemoryHistoryStore {
    /// Records by user ID, oldest first
    records: DashMap<UserId, Vec<PointHistory>>,

    /// Next record ID to hand out
    next_id: AtomicU64,
}

impl InMemoryHistoryStore {
    /// Create an empty history log
    ///
    /// Record IDs start at 1.
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Total number of records across all users
    pub fn total_records(&self) -> usize {
        self.records.iter().map(|entry| entry.value().len()).sum()
    }
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn append(
        &self,
        user: UserId,
        kind: TransactionType,
        amount: Points,
        recorded_at: DateTime<Utc>,
    ) -> Result<PointHistory, PointError> {
        let id: HistoryId = self.next_id.fetch_add(1, Ordering::Relaxed);
        let record = PointHistory {
            id,
            user_id: user,
            kind,
            amount,
            recorded_at,
        };

        self.records.entry(user).or_default().push(record.clone());

        Ok(record)
    }

    fn list_by_user(&self, user: UserId) -> Result<Vec<PointHistory>, PointError> {
        Ok(self
            .records
            .get(&user)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}
