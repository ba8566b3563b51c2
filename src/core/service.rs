//! Point balance coordination
//!
//! This module provides `PointService`, which applies charge and use requests
//! to the balance store and records them in the history store.
//!
//! # Design
//!
//! Every mutation runs the same sequence:
//!
//! ```text
//! validate amount ──► acquire user lock ──► read ──► check ──► write ──► append history ──► release
//!   (no lock)          (bounded wait)        └──────────── under the user's lock ────────────┘
//! ```
//!
//! Holding the lock across the history append keeps each user's history in the
//! same order as the balance mutations it records.
//!
//! # Architecture
//!
//! ```text
//! PointService
//!     ├── Arc<B: BalanceStore>   (balance table)
//!     ├── Arc<H: HistoryStore>   (history log)
//!     ├── Arc<LockRegistry>      (per-user mutexes)
//!     └── PointPolicy            (amount bands, ceiling, lock wait)
//! ```
//!
//! # Failure after commit
//!
//! If the history append fails after the balance write succeeded, the balance
//! stays committed and the append error is returned to the caller. There is no
//! compensating write. The inconsistency is logged at `error` level with the
//! committed balance so it can be repaired out of band.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::core::history_store::InMemoryHistoryStore;
use crate::core::lock_registry::LockRegistry;
use crate::core::point_store::InMemoryPointStore;
use crate::core::policy::PointPolicy;
use crate::core::traits::{BalanceStore, HistoryStore};
use crate::types::{
    PointCommand, PointError, PointHistory, Points, TransactionType, UserId, UserPoint,
};

/// Point service over the in-memory stores
pub type InMemoryPointService = PointService<InMemoryPointStore, InMemoryHistoryStore>;

/// Coordinates balance mutations under per-user locks
///
/// Cheap to clone; clones share the stores and the lock registry and can be
/// moved into spawned tasks.
pub struct PointService<B, H> {
    balances: Arc<B>,
    history: Arc<H>,
    locks: Arc<LockRegistry>,
    policy: PointPolicy,
}

impl<B, H> Clone for PointService<B, H> {
    fn clone(&self) -> Self {
        Self {
            balances: Arc::clone(&self.balances),
            history: Arc::clone(&self.history),
            locks: Arc::clone(&self.locks),
            policy: self.policy.clone(),
        }
    }
}

impl InMemoryPointService {
    /// Create a service over fresh in-memory stores and a fresh lock registry
    pub fn in_memory(policy: PointPolicy) -> Self {
        Self::new(
            Arc::new(InMemoryPointStore::new()),
            Arc::new(InMemoryHistoryStore::new()),
            Arc::new(LockRegistry::new()),
            policy,
        )
    }
}

impl<B: BalanceStore, H: HistoryStore> PointService<B, H> {
    /// Create a new PointService
    ///
    /// Services that mutate the same stores must share the same `LockRegistry`,
    /// otherwise their mutations are not serialized against each other.
    pub fn new(
        balances: Arc<B>,
        history: Arc<H>,
        locks: Arc<LockRegistry>,
        policy: PointPolicy,
    ) -> Self {
        Self {
            balances,
            history,
            locks,
            policy,
        }
    }

    /// Limits this service enforces
    pub fn policy(&self) -> &PointPolicy {
        &self.policy
    }

    /// The balance store this service writes to
    pub fn balance_store(&self) -> &Arc<B> {
        &self.balances
    }

    /// The history store this service appends to
    pub fn history_store(&self) -> &Arc<H> {
        &self.history
    }

    /// The lock registry serializing this service's mutations
    pub fn lock_registry(&self) -> &Arc<LockRegistry> {
        &self.locks
    }

    /// Add points to a user's balance
    ///
    /// # Returns
    ///
    /// * `Ok(UserPoint)` - The balance after the charge
    /// * `Err(PointError::InvalidAmount)` - Amount outside the charge band
    /// * `Err(PointError::LockTimeout)` - The user's lock stayed busy; retry
    /// * `Err(PointError::BalanceCeilingExceeded)` - Result would exceed the ceiling
    /// * `Err(PointError::StoreFailure)` - A store call failed
    pub async fn charge(&self, user: UserId, amount: Points) -> Result<UserPoint, PointError> {
        self.mutate(user, TransactionType::Charge, amount).await
    }

    /// Spend points from a user's balance
    ///
    /// # Returns
    ///
    /// * `Ok(UserPoint)` - The balance after the use
    /// * `Err(PointError::InvalidAmount)` - Amount outside the use band
    /// * `Err(PointError::LockTimeout)` - The user's lock stayed busy; retry
    /// * `Err(PointError::InsufficientBalance)` - Amount exceeds the balance
    /// * `Err(PointError::StoreFailure)` - A store call failed
    pub async fn use_points(&self, user: UserId, amount: Points) -> Result<UserPoint, PointError> {
        self.mutate(user, TransactionType::Use, amount).await
    }

    /// Apply a parsed charge/use command
    pub async fn apply(&self, command: &PointCommand) -> Result<UserPoint, PointError> {
        self.mutate(command.user, command.kind, command.amount).await
    }

    /// Current balance of a user
    ///
    /// Lock-free. The value may be overtaken by a concurrent charge or use
    /// the moment it is returned.
    pub fn get_balance(&self, user: UserId) -> Result<UserPoint, PointError> {
        self.balances.read(user)
    }

    /// History of a user, oldest first
    ///
    /// Lock-free, with the same staleness caveat as [`Self::get_balance`].
    pub fn get_history(&self, user: UserId) -> Result<Vec<PointHistory>, PointError> {
        self.history.list_by_user(user)
    }

    async fn mutate(
        &self,
        user: UserId,
        kind: TransactionType,
        amount: Points,
    ) -> Result<UserPoint, PointError> {
        if let Err(e) = self.policy.validate_amount(kind, amount) {
            warn!(user, %kind, amount, "Rejected point request: {}", e);
            return Err(e);
        }

        let guard = self.locks.acquire(user, self.policy.lock_timeout()).await?;

        let current = self
            .balances
            .read(user)
            .inspect_err(|e| error!(user, %kind, "Balance read failed: {}", e))?;
        let next = match kind {
            TransactionType::Charge => self.charged_balance(&current, amount)?,
            TransactionType::Use => self.used_balance(&current, amount)?,
        };

        let updated = self
            .balances
            .write(user, next)
            .inspect_err(|e| error!(user, %kind, point = next, "Balance write failed: {}", e))?;

        if let Err(e) = self
            .history
            .append(user, kind, amount, updated.updated_at)
        {
            error!(
                user,
                %kind,
                amount,
                committed_point = updated.point,
                "Balance committed but history append failed: {}",
                e
            );
            return Err(e);
        }

        debug!(user, %kind, amount, point = updated.point, "Applied point request");
        guard.release();

        Ok(updated)
    }

    /// Balance after charging `amount`, or the reason it is refused
    ///
    /// A `PointPolicy` keeps `max_balance + max_charge` inside `Points`, so the
    /// addition only overflows when the store hands back a balance far above
    /// the ceiling.
    fn charged_balance(&self, current: &UserPoint, amount: Points) -> Result<Points, PointError> {
        let next = current
            .point
            .checked_add(amount)
            .ok_or_else(|| PointError::arithmetic_overflow("charge", current.id))?;

        if next > self.policy.max_balance() {
            let e = PointError::balance_ceiling_exceeded(
                current.id,
                current.point,
                amount,
                self.policy.max_balance(),
            );
            warn!(user = current.id, amount, "Rejected point request: {}", e);
            return Err(e);
        }

        Ok(next)
    }

    /// Balance after using `amount`, or the reason it is refused
    fn used_balance(&self, current: &UserPoint, amount: Points) -> Result<Points, PointError> {
        if amount > current.point {
            let e = PointError::insufficient_balance(current.id, current.point, amount);
            warn!(user = current.id, amount, "Rejected point request: {}", e);
            return Err(e);
        }

        // amount <= current.point, so this stays >= 0
        Ok(current.point - amount)
    }
}
