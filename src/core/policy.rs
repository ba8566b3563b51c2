//! Business limits applied by the point service
//!
//! `PointPolicy` bundles the amount bands, the balance ceiling and the lock
//! wait bound. The defaults are the production limits; tests and the CLI
//! override individual values through [`PointPolicy::new`] and
//! [`PointPolicy::with_lock_timeout`], which never produce an unusable policy.

use crate::types::{PointError, Points, TransactionType};
use std::time::Duration;
use tracing::warn;

/// Smallest accepted charge
pub const MIN_CHARGE: Points = 1_000;
/// Largest accepted charge
pub const MAX_CHARGE: Points = 100_000;
/// Smallest accepted use
pub const MIN_USE: Points = 1_000;
/// Largest accepted use
pub const MAX_USE: Points = 500_000;
/// Ceiling no balance may exceed
pub const MAX_BALANCE: Points = 1_000_000;
/// Default bound on waiting for a user's lock
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(3);

/// Largest value any configured limit may take
///
/// Keeps `max_balance + max_charge` inside `Points`.
pub const POINTS_LIMIT: Points = Points::MAX / 2;

/// Whole milliseconds of a duration, saturating at `u64::MAX`
pub fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Limits enforced by the point service
///
/// All bounds are inclusive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointPolicy {
    min_charge: Points,
    max_charge: Points,
    min_use: Points,
    max_use: Points,
    max_balance: Points,
    lock_timeout: Duration,
}

impl Default for PointPolicy {
    fn default() -> Self {
        Self {
            min_charge: MIN_CHARGE,
            max_charge: MAX_CHARGE,
            min_use: MIN_USE,
            max_use: MAX_USE,
            max_balance: MAX_BALANCE,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }
}

/// `band` if `1 <= min <= max <= POINTS_LIMIT`, otherwise `default`
fn checked_band(
    kind: TransactionType,
    band: (Points, Points),
    default: (Points, Points),
) -> (Points, Points) {
    let (min, max) = band;
    if 1 <= min && min <= max && max <= POINTS_LIMIT {
        return band;
    }

    warn!(
        %kind,
        min,
        max,
        default_min = default.0,
        default_max = default.1,
        "Invalid amount band, using default"
    );
    default
}

impl PointPolicy {
    /// Create a policy with custom amount bands and balance ceiling
    ///
    /// Each band must satisfy `1 <= min <= max <= POINTS_LIMIT` and the
    /// ceiling must lie in `1..=POINTS_LIMIT`. Invalid values fall back to the
    /// defaults with a warning. The lock timeout starts at the default.
    pub fn new(
        charge_band: (Points, Points),
        use_band: (Points, Points),
        max_balance: Points,
    ) -> Self {
        let (min_charge, max_charge) =
            checked_band(TransactionType::Charge, charge_band, (MIN_CHARGE, MAX_CHARGE));
        let (min_use, max_use) = checked_band(TransactionType::Use, use_band, (MIN_USE, MAX_USE));

        let max_balance = if (1..=POINTS_LIMIT).contains(&max_balance) {
            max_balance
        } else {
            warn!(
                max_balance,
                default = MAX_BALANCE,
                "Invalid balance ceiling, using default"
            );
            MAX_BALANCE
        };

        Self {
            min_charge,
            max_charge,
            min_use,
            max_use,
            max_balance,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Return a copy of this policy with a different lock wait bound
    ///
    /// A zero timeout would turn every contended request into a failure, so
    /// it falls back to the default with a warning.
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        if lock_timeout.is_zero() {
            warn!(
                default_ms = duration_millis(DEFAULT_LOCK_TIMEOUT),
                "Invalid lock timeout (0ms), using default"
            );
            self.lock_timeout = DEFAULT_LOCK_TIMEOUT;
        } else {
            self.lock_timeout = lock_timeout;
        }
        self
    }

    /// How long charge/use wait for the user's lock before giving up
    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    /// Largest balance a user may hold
    pub fn max_balance(&self) -> Points {
        self.max_balance
    }

    /// Inclusive `[min, max]` band for an operation
    pub fn amount_band(&self, kind: TransactionType) -> (Points, Points) {
        match kind {
            TransactionType::Charge => (self.min_charge, self.max_charge),
            TransactionType::Use => (self.min_use, self.max_use),
        }
    }

    /// Check a requested amount against the band of its operation
    pub fn validate_amount(&self, kind: TransactionType, amount: Points) -> Result<(), PointError> {
        let (min, max) = self.amount_band(kind);
        if amount < min || amount > max {
            return Err(PointError::invalid_amount(kind, amount, min, max));
        }
        Ok(())
    }
}
