//! Thread-safe in-memory balance table
//!
//! This module provides `InMemoryPointStore`, the default [`BalanceStore`]
//! implementation. Balances live in a `DashMap` keyed by user ID, so every
//! individual read or write is atomic, and reads and writes for different
//! users do not contend on a global lock.
//!
//! # Consistency
//!
//! The store gives no guarantee across calls: a `read` followed by a `write`
//! can interleave with another caller's `write`. The point service closes that
//! gap with the per-user lock; the store does not try to.

use crate::core::traits::BalanceStore;
use crate::types::{PointError, Points, UserId, UserPoint};
use dashmap::DashMap;

/// In-memory balance table backed by `DashMap`
#[derive(Debug, Default)]
pub struct InMemoryPointStore {
    /// Stored balances by user ID
    ///
    /// Users that were only ever read have no entry.
    balances: DashMap<UserId, UserPoint>,
}

impl InMemoryPointStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            balances: DashMap::new(),
        }
    }

    /// Snapshot of every stored balance
    ///
    /// The balances are returned in arbitrary order. Each entry is consistent
    /// on its own but the set as a whole is not a point-in-time view while
    /// writers are active.
    pub fn snapshot(&self) -> Vec<UserPoint> {
        self.balances
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of users with a stored balance row
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// Whether no balance row has been written yet
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

impl BalanceStore for InMemoryPointStore {
    fn read(&self, user: UserId) -> Result<UserPoint, PointError> {
        Ok(self
            .balances
            .get(&user)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| UserPoint::empty(user)))
    }

    fn write(&self, user: UserId, point: Points) -> Result<UserPoint, PointError> {
        let snapshot = UserPoint::new(user, point);
        self.balances.insert(user, snapshot.clone());
        Ok(snapshot)
    }
}
