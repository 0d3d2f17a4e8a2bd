//! The `PricingEngine` facade.
//!
//! Ties the components together behind the operations the host layer calls:
//! tier resolution, quota checks, cost computation, tier changes and invoice
//! aggregation. Every operation works against the configuration snapshot
//! current at call time; configuration is injected through the
//! [`ConfigStore`], never read from process-wide state.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::{ConfigError, ConfigStore, LanguageCode, PricingConfiguration, TierId};
use crate::cost::{CostCalculator, CostError, SessionCharge, SessionFacts};
use crate::invoice::{Invoice, InvoiceError, InvoiceLedger};
use crate::quota::{QuotaError, UsageRegistry, check_language_selection};
use crate::tier::{
    CustomerContext, TierChange, TierError, TierLockManager, TierLockState, TierResolution,
    TierResolver,
};

/// Any error an engine operation can surface
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Tier(#[from] TierError),
    #[error(transparent)]
    Quota(#[from] QuotaError),
    #[error(transparent)]
    Cost(#[from] CostError),
    #[error(transparent)]
    Invoice(#[from] InvoiceError),
}

/// Result type for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Synchronous pricing/quota engine over an injected configuration.
#[derive(Clone)]
pub struct PricingEngine {
    store: Arc<ConfigStore>,
    usage: UsageRegistry,
    ledger: InvoiceLedger,
}

impl PricingEngine {
    pub fn new(store: ConfigStore) -> Self {
        Self::with_store(Arc::new(store))
    }

    pub fn with_store(store: Arc<ConfigStore>) -> Self {
        Self {
            store,
            usage: UsageRegistry::new(),
            ledger: InvoiceLedger::new(),
        }
    }

    /// Active configuration snapshot.
    pub fn config(&self) -> Arc<PricingConfiguration> {
        self.store.get()
    }

    /// Resolves the effective tier limits for a customer.
    pub fn resolve_tier(
        &self,
        ctx: &CustomerContext,
        requested: Option<&TierId>,
    ) -> EngineResult<TierResolution> {
        let config = self.store.get();
        Ok(TierResolver::new(&config).resolve(ctx, requested)?)
    }

    /// Validates a proposed language selection and, for free-tier customers,
    /// the remaining daily minutes. Both checks must pass before a session
    /// may start.
    pub fn check_quota(
        &self,
        ctx: &CustomerContext,
        requested: Option<&TierId>,
        target_languages: &BTreeSet<LanguageCode>,
        now: DateTime<Utc>,
    ) -> EngineResult<()> {
        let config = self.store.get();
        let limits = match TierResolver::new(&config).resolve(ctx, requested)? {
            TierResolution::Resolved(limits) => limits,
            TierResolution::Unresolved => return Err(CostError::UnresolvedTier.into()),
        };

        check_language_selection(target_languages, &limits)?;

        if limits.is_free_tier {
            let usage = self.usage.current(&ctx.customer_id, &config.free_tier, now);
            usage.check(&config.free_tier.reset, now)?;
        }
        Ok(())
    }

    /// Computes the charge for a completed session.
    pub fn compute_cost(
        &self,
        ctx: &CustomerContext,
        requested: Option<&TierId>,
        facts: &SessionFacts,
    ) -> EngineResult<SessionCharge> {
        let config = self.store.get();
        let limits = match TierResolver::new(&config).resolve(ctx, requested)? {
            TierResolution::Resolved(limits) => limits,
            TierResolution::Unresolved => return Err(CostError::UnresolvedTier.into()),
        };
        let charge = CostCalculator::new(&config.participant_scaling).compute(facts, &limits)?;
        Ok(charge)
    }

    /// Consumes free-tier minutes for elapsed session time. Returns the
    /// minutes remaining after the decrement.
    pub fn consume_free_minutes(
        &self,
        customer_id: &str,
        minutes: u32,
        now: DateTime<Utc>,
    ) -> EngineResult<u32> {
        let config = self.store.get();
        let usage = self.usage.current(customer_id, &config.free_tier, now);
        Ok(usage.try_consume(minutes, &config.free_tier.reset, now)?)
    }

    /// Whether a tier change is currently allowed for this lock state.
    pub fn can_change_tier(&self, state: &TierLockState, now: DateTime<Utc>) -> bool {
        let config = self.store.get();
        TierLockManager::for_config(&config).can_change_tier(state, now)
    }

    /// First date a locked customer becomes eligible to change again.
    pub fn next_change_date(&self, now: DateTime<Utc>) -> NaiveDate {
        let config = self.store.get();
        TierLockManager::for_config(&config).next_change_date(now)
    }

    /// Applies the once-per-month tier-change rule and returns the new lock
    /// state plus whether the caller must clear the language selection.
    pub fn change_tier(
        &self,
        state: &TierLockState,
        new_tier: &TierId,
        selected_language_count: u32,
        now: DateTime<Utc>,
    ) -> EngineResult<TierChange> {
        let config = self.store.get();
        Ok(TierLockManager::for_config(&config).change_tier(
            state,
            new_tier,
            selected_language_count,
            &config,
            now,
        )?)
    }

    /// Adds a charge to the customer's invoice for the billing period,
    /// opening the invoice on first use. Returns the recomputed total.
    pub fn add_charge(
        &self,
        customer_id: &str,
        period_start: NaiveDate,
        period_end: NaiveDate,
        charge: SessionCharge,
    ) -> EngineResult<Decimal> {
        let config = self.store.get();
        self.ledger
            .open(customer_id, period_start, period_end, config.currency.clone());
        Ok(self.ledger.add_charge(customer_id, period_start, charge)?)
    }

    /// Finalizes the customer's invoice for the period (`pending -> paid`).
    pub fn finalize_invoice(
        &self,
        customer_id: &str,
        period_start: NaiveDate,
    ) -> EngineResult<()> {
        Ok(self.ledger.finalize(customer_id, period_start)?)
    }

    /// Point-in-time copy of a customer's invoice.
    pub fn invoice(&self, customer_id: &str, period_start: NaiveDate) -> Option<Invoice> {
        self.ledger.snapshot(customer_id, period_start)
    }
}
