//! Tier resolution and the monthly tier-change lock.

mod lock;
mod resolver;

pub use lock::{TierChange, TierLockManager, TierLockState};
pub use resolver::{CustomerContext, EffectiveTierLimits, TierResolution, TierResolver, TierUsed};

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::TierId;

/// Errors raised while resolving or changing tiers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TierError {
    /// Requested tier does not exist in the active configuration
    #[error("Unknown tier: {tier_id}")]
    UnknownTier {
        /// The tier that could not be found
        tier_id: TierId,
    },

    /// Tier was already changed this billing month
    #[error("Tier changes are locked until {next_change}")]
    TierLocked {
        /// First date a change becomes possible again
        next_change: NaiveDate,
    },
}

/// Result type for tier operations
pub type TierResult<T> = std::result::Result<T, TierError>;
