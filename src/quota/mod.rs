//! Pre-session quota enforcement.
//!
//! Two independent checks gate a session start: the language-count check and,
//! for free-tier customers, the remaining daily minutes. Both surface typed
//! errors meant to reach the end user as actionable guidance.

mod language;
mod usage;

pub use language::check_language_selection;
pub use usage::{DailyUsage, UsageRegistry};

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised when a proposed session violates its tier's quotas
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuotaError {
    /// Fewer target languages selected than the tier specifies
    #[error("Select {missing} more language(s) to match this tier")]
    TooFewLanguages {
        /// Languages to add to become valid
        missing: u32,
    },

    /// More target languages selected than the tier specifies
    #[error("Remove {excess} language(s) to match this tier")]
    TooManyLanguages {
        /// Languages to remove to become valid
        excess: u32,
    },

    /// Free-tier daily minutes are used up for the current window
    #[error("Daily free minutes are exhausted; allowance resets at {resets_at}")]
    DailyQuotaExhausted {
        /// Next scheduled reset of the allowance
        resets_at: DateTime<Utc>,
    },
}

/// Result type for quota checks
pub type QuotaResult<T> = std::result::Result<T, QuotaError>;
