//! Per-user lock registry
//!
//! `LockRegistry` maps each user ID to its own mutex so that charge/use
//! requests for one user are serialized while requests for different users
//! never wait on each other.
//!
//! # Design
//!
//! - Entries are created lazily through `DashMap::entry(..).or_insert_with(..)`,
//!   which checks and inserts under the shard lock. Two tasks touching a new
//!   user at the same time always end up with the same mutex.
//! - Each entry is an `Arc<tokio::sync::Mutex<()>>`. Tokio's mutex queues
//!   waiters in FIFO order, so a steady stream of requests cannot starve an
//!   earlier waiter.
//! - Acquisition is bounded by `tokio::time::timeout`. When the bound elapses
//!   the pending `lock_owned` future is dropped, which removes the waiter from
//!   the queue; the caller has not touched any state at that point.
//! - Entries are never evicted. Memory grows with the number of distinct users
//!   seen, one small mutex each.
//!
//! The shard guard returned by `entry` is released before any `.await`, so the
//! registry map is never held while waiting for a user's lock.

use crate::core::policy::duration_millis;
use crate::types::{PointError, UserId};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

/// Exclusive hold on one user's lock
///
/// The lock is released when the guard is dropped, on every exit path of the
/// holder including early returns and panics.
#[derive(Debug)]
pub struct UserLockGuard {
    user: UserId,
    _guard: OwnedMutexGuard<()>,
}

impl UserLockGuard {
    /// The user whose lock this guard holds
    pub fn user(&self) -> UserId {
        self.user
    }

    /// Release the lock explicitly
    pub fn release(self) {
        drop(self);
    }
}

/// Registry of per-user mutexes
///
/// Meant to be created once per process and shared through an `Arc` by every
/// point service instance that mutates the same stores.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl LockRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Get the mutex of a user, creating it on first reference
    fn lock_for(&self, user: UserId) -> Arc<Mutex<()>> {
        let entry = self.locks.entry(user).or_insert_with(|| {
            debug!(user, "Creating user lock");
            Arc::new(Mutex::new(()))
        });
        Arc::clone(entry.value())
    }

    /// Acquire the lock of a user, waiting at most `timeout`
    ///
    /// # Returns
    ///
    /// * `Ok(UserLockGuard)` - The caller now holds the user's lock
    /// * `Err(PointError::LockTimeout)` - The lock stayed busy for the whole wait
    pub async fn acquire(
        &self,
        user: UserId,
        timeout: Duration,
    ) -> Result<UserLockGuard, PointError> {
        let lock = self.lock_for(user);

        match tokio::time::timeout(timeout, lock.lock_owned()).await {
            Ok(guard) => Ok(UserLockGuard {
                user,
                _guard: guard,
            }),
            Err(_) => {
                let waited_ms = duration_millis(timeout);
                warn!(user, waited_ms, "Timed out waiting for user lock");
                Err(PointError::lock_timeout(user, waited_ms))
            }
        }
    }

    /// Whether a user's lock is currently held
    ///
    /// Diagnostic check only: the answer can be stale as soon as it returns.
    /// Users without a registry entry report `false`.
    pub fn is_locked(&self, user: UserId) -> bool {
        self.locks
            .get(&user)
            .map(|lock| lock.try_lock().is_err())
            .unwrap_or(false)
    }

    /// Number of users that have a lock entry
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no lock has been created yet
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
