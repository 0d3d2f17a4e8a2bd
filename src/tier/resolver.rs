//! Effective tier resolution.
//!
//! Given a customer context and an optional requested tier, produces the
//! limits and rates a session will be quoted against. The free tier and an
//! existing locked selection both take precedence over the request.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::lock::TierLockState;
use super::{TierError, TierResult};
use crate::config::{FreeTierConfig, PaygTier, PricingConfiguration, TierId};

/// Which pricing plan a resolution or charge is based on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "tier_id", rename_all = "snake_case")]
pub enum TierUsed {
    Free,
    Payg(TierId),
}

impl TierUsed {
    pub fn tier_id(&self) -> Option<&str> {
        match self {
            Self::Payg(id) => Some(id),
            Self::Free => None,
        }
    }
}

/// Limits and rates derived from the configuration for one resolution call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveTierLimits {
    pub tier: TierUsed,
    pub translation_limit: u32,
    pub total_language_limit: u32,
    /// Zero for the free tier, which has no per-hour rate.
    pub base_rate_per_hour: Decimal,
    pub overage_rate_per_hour: Decimal,
    pub is_free_tier: bool,
}

impl EffectiveTierLimits {
    pub(crate) fn free(config: &FreeTierConfig) -> Self {
        Self {
            tier: TierUsed::Free,
            translation_limit: config.translation_limit,
            total_language_limit: config.total_language_limit,
            base_rate_per_hour: Decimal::ZERO,
            overage_rate_per_hour: Decimal::ZERO,
            is_free_tier: true,
        }
    }

    pub(crate) fn payg(tier_id: &TierId, tier: &PaygTier) -> Self {
        Self {
            tier: TierUsed::Payg(tier_id.clone()),
            translation_limit: tier.translation_limit,
            total_language_limit: tier.total_language_limit,
            base_rate_per_hour: tier.base_rate_per_hour,
            overage_rate_per_hour: tier.overage_rate_per_hour,
            is_free_tier: false,
        }
    }
}

/// Outcome of a resolution call.
#[derive(Debug, Clone, PartialEq)]
pub enum TierResolution {
    Resolved(EffectiveTierLimits),
    /// No tier is selected or requested; a tier must be chosen before a
    /// session can be quoted.
    Unresolved,
}

impl TierResolution {
    pub fn limits(&self) -> Option<&EffectiveTierLimits> {
        match self {
            Self::Resolved(limits) => Some(limits),
            Self::Unresolved => None,
        }
    }
}

/// Per-customer facts the resolver needs.
#[derive(Debug, Clone, Default)]
pub struct CustomerContext {
    pub customer_id: String,
    pub on_free_tier: bool,
    pub lock: TierLockState,
}

impl CustomerContext {
    pub fn free_tier(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            on_free_tier: true,
            lock: TierLockState::default(),
        }
    }

    pub fn payg(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            on_free_tier: false,
            lock: TierLockState::default(),
        }
    }

    pub fn with_lock(mut self, lock: TierLockState) -> Self {
        self.lock = lock;
        self
    }
}

/// Resolves effective limits against one configuration snapshot.
pub struct TierResolver<'a> {
    config: &'a PricingConfiguration,
}

impl<'a> TierResolver<'a> {
    pub fn new(config: &'a PricingConfiguration) -> Self {
        Self { config }
    }

    /// Resolution rules, in priority order: free tier, locked tier,
    /// requested tier, unresolved.
    pub fn resolve(
        &self,
        ctx: &CustomerContext,
        requested: Option<&TierId>,
    ) -> TierResult<TierResolution> {
        if ctx.on_free_tier {
            return Ok(TierResolution::Resolved(EffectiveTierLimits::free(
                &self.config.free_tier,
            )));
        }

        // A locked selection wins even when the request differs; callers go
        // through the lock manager to change it.
        if let Some(locked) = &ctx.lock.current_tier {
            return self.payg_limits(locked).map(TierResolution::Resolved);
        }

        match requested {
            Some(tier_id) => self.payg_limits(tier_id).map(TierResolution::Resolved),
            None => Ok(TierResolution::Unresolved),
        }
    }

    fn payg_limits(&self, tier_id: &TierId) -> TierResult<EffectiveTierLimits> {
        self.config
            .payg_tiers
            .get(tier_id)
            .map(|tier| EffectiveTierLimits::payg(tier_id, tier))
            .ok_or_else(|| TierError::UnknownTier {
                tier_id: tier_id.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn config() -> PricingConfiguration {
        PricingConfiguration::builtin()
    }

    #[test]
    fn test_free_tier_wins_over_request() {
        let config = config();
        let resolver = TierResolver::new(&config);
        let ctx = CustomerContext::free_tier("cust-1");

        let resolution = resolver
            .resolve(&ctx, Some(&"professional".to_string()))
            .unwrap();
        let limits = resolution.limits().unwrap();
        assert!(limits.is_free_tier);
        assert_eq!(limits.base_rate_per_hour, Decimal::ZERO);
        assert_eq!(limits.translation_limit, 1);
    }

    #[test]
    fn test_locked_tier_wins_over_request() {
        let config = config();
        let resolver = TierResolver::new(&config);
        let ctx = CustomerContext::payg("cust-1").with_lock(TierLockState {
            current_tier: Some("starter".to_string()),
            selected_on: Some(Utc::now()),
        });

        let resolution = resolver
            .resolve(&ctx, Some(&"business".to_string()))
            .unwrap();
        let limits = resolution.limits().unwrap();
        assert_eq!(limits.tier, TierUsed::Payg("starter".to_string()));
        assert_eq!(limits.base_rate_per_hour, dec!(25));
    }

    #[test]
    fn test_requested_tier_used_without_lock() {
        let config = config();
        let resolver = TierResolver::new(&config);
        let ctx = CustomerContext::payg("cust-1");

        let resolution = resolver
            .resolve(&ctx, Some(&"professional".to_string()))
            .unwrap();
        let limits = resolution.limits().unwrap();
        assert_eq!(limits.base_rate_per_hour, dec!(75));
        assert_eq!(limits.translation_limit, 5);
        assert!(!limits.is_free_tier);
    }

    #[test]
    fn test_no_tier_is_unresolved() {
        let config = config();
        let resolver = TierResolver::new(&config);
        let ctx = CustomerContext::payg("cust-1");

        let resolution = resolver.resolve(&ctx, None).unwrap();
        assert_eq!(resolution, TierResolution::Unresolved);
        assert!(resolution.limits().is_none());
    }

    #[test]
    fn test_unknown_tier_is_an_error() {
        let config = config();
        let resolver = TierResolver::new(&config);
        let ctx = CustomerContext::payg("cust-1");

        let err = resolver
            .resolve(&ctx, Some(&"enterprise".to_string()))
            .unwrap_err();
        assert_eq!(
            err,
            TierError::UnknownTier {
                tier_id: "enterprise".to_string()
            }
        );
    }
}
