//! Versioned pricing configuration.
//!
//! ```rust
//! use lingua_billing::config::ConfigStore;
//!
//! # fn example() -> Result<(), lingua_billing::config::ConfigError> {
//! let store = ConfigStore::builtin()?;
//! let config = store.get();
//! assert!(config.payg_tiers.contains_key("professional"));
//! # Ok(())
//! # }
//! ```

mod model;
mod store;

pub use model::{
    FreeTierConfig, LanguageCode, ParticipantScaling, PaygTier, PricingConfiguration,
    ResetInterval, ResetSchedule, TierId,
};
pub use store::ConfigStore;

use thiserror::Error;

/// Errors that can occur in configuration operations
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The offending configuration key
        key: String,
        /// Error message
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Multiple validation errors
    #[error("{0}")]
    ValidationErrors(ValidationErrors),
}

/// Collects every violated invariant of a configuration so callers can
/// report a complete diagnostic rather than the first failure.
#[derive(Debug)]
pub struct ValidationErrors(pub Vec<ConfigError>);

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Validation failed: ")?;
        let msgs: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", msgs.join("; "))
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
