//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust
//! use lingua_billing::prelude::*;
//! ```

// Engine
pub use crate::engine::{EngineError, EngineResult, PricingEngine};

// Configuration
pub use crate::config::{ConfigStore, PricingConfiguration};

// Tiers
pub use crate::tier::{
    CustomerContext, EffectiveTierLimits, TierLockManager, TierLockState, TierResolution, TierUsed,
};

// Quotas
pub use crate::quota::QuotaError;

// Cost
pub use crate::cost::{CostCalculator, SessionCharge, SessionFacts};

// Invoicing
pub use crate::invoice::{Invoice, InvoiceLedger, InvoiceStatus};
