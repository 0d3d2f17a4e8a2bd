//! # lingua-billing
//!
//! Pricing and quota engine for a real-time meeting-translation product.
//!
//! The engine is a set of pure, synchronous functions over immutable value
//! types: it resolves a customer's effective tier, enforces language and
//! participant quotas, computes session cost (base rate, prorated language
//! overage, participant-count scaling), governs the monthly tier-change
//! lock-in and aggregates charges into invoices. Session orchestration,
//! persistence and payment capture live in the host layer.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::{BTreeMap, BTreeSet};
//!
//! use chrono::NaiveDate;
//! use lingua_billing::prelude::*;
//! use rust_decimal_macros::dec;
//! use uuid::Uuid;
//!
//! # fn main() -> Result<(), lingua_billing::EngineError> {
//! let engine = PricingEngine::new(ConfigStore::builtin()?);
//! let ctx = CustomerContext::payg("cust-1");
//! let professional = "professional".to_string();
//!
//! let facts = SessionFacts {
//!     session_id: Uuid::new_v4(),
//!     duration_hours: dec!(1),
//!     source_language: "en".into(),
//!     target_languages: BTreeSet::from([
//!         "es".into(), "fr".into(), "de".into(), "it".into(), "pt".into(),
//!     ]),
//!     participant_count: 80,
//!     active_minutes: BTreeMap::new(),
//!     date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
//! };
//!
//! let charge = engine.compute_cost(&ctx, Some(&professional), &facts)?;
//! assert_eq!(charge.total_cost, dec!(75.00));
//! # Ok(())
//! # }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod cost;
pub mod engine;
pub mod invoice;
pub mod prelude;
pub mod quota;
pub mod tier;

// Re-exports for convenience
pub use config::{
    ConfigError, ConfigStore, FreeTierConfig, LanguageCode, ParticipantScaling, PaygTier,
    PricingConfiguration, ResetInterval, ResetSchedule, TierId, ValidationErrors,
};
pub use cost::{CostCalculator, CostError, SessionCharge, SessionFacts};
pub use engine::{EngineError, EngineResult, PricingEngine};
pub use invoice::{Invoice, InvoiceError, InvoiceKey, InvoiceLedger, InvoiceStatus};
pub use quota::{DailyUsage, QuotaError, UsageRegistry, check_language_selection};
pub use tier::{
    CustomerContext, EffectiveTierLimits, TierChange, TierError, TierLockManager, TierLockState,
    TierResolution, TierResolver, TierUsed,
};
