//! Session cost computation.

mod calculator;
mod facts;

pub use calculator::CostCalculator;
pub use facts::{SessionCharge, SessionFacts};

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while computing a session charge
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CostError {
    /// Session duration must be strictly positive
    #[error("Session duration must be positive, got {duration}h")]
    InvalidDuration {
        /// The rejected duration in hours
        duration: Decimal,
    },

    /// Empty target set on a tier that includes target languages
    #[error("No target languages selected for a tier that includes {included}")]
    NoTargetLanguages {
        /// Target languages the tier includes
        included: u32,
    },

    /// No tier resolved; a tier must be chosen before a session can be quoted
    #[error("No pricing tier resolved; choose a tier before quoting")]
    UnresolvedTier,
}

/// Result type for cost computations
pub type CostResult<T> = std::result::Result<T, CostError>;
