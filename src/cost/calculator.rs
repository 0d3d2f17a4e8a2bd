//! Charge computation: base rate, prorated language overage and the
//! participant step multiplier.
//!
//! Pure over its inputs: identical facts and limits always produce an
//! identical charge apart from the freshly minted charge id.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::{CostError, CostResult, SessionCharge, SessionFacts};
use crate::config::{LanguageCode, ParticipantScaling};
use crate::tier::EffectiveTierLimits;

const MINUTES_PER_HOUR: Decimal = dec!(60);

/// Computes session charges against one participant-scaling policy.
pub struct CostCalculator<'a> {
    scaling: &'a ParticipantScaling,
}

impl<'a> CostCalculator<'a> {
    pub fn new(scaling: &'a ParticipantScaling) -> Self {
        Self { scaling }
    }

    /// Produces the [`SessionCharge`] for `facts` under `limits`.
    ///
    /// `total = (base + overage) * multiplier`, rounded half-up to two
    /// decimals. The free tier has no per-hour rate, so its base cost is
    /// zero.
    pub fn compute(
        &self,
        facts: &SessionFacts,
        limits: &EffectiveTierLimits,
    ) -> CostResult<SessionCharge> {
        if facts.duration_hours <= Decimal::ZERO {
            return Err(CostError::InvalidDuration {
                duration: facts.duration_hours,
            });
        }
        if facts.target_languages.is_empty() && limits.translation_limit > 0 {
            return Err(CostError::NoTargetLanguages {
                included: limits.translation_limit,
            });
        }

        let base_cost = if limits.is_free_tier {
            Decimal::ZERO
        } else {
            limits.base_rate_per_hour * facts.duration_hours
        };
        let overage_cost = self.overage_cost(facts, limits);
        let multiplier = self.participant_multiplier(facts.participant_count);
        let total_cost = round_currency((base_cost + overage_cost) * multiplier);

        tracing::debug!(
            session_id = %facts.session_id,
            %total_cost,
            "computed session charge"
        );

        Ok(SessionCharge {
            charge_id: Uuid::new_v4(),
            session_id: facts.session_id,
            duration_hours: facts.duration_hours,
            base_cost: round_currency(base_cost),
            overage_cost: round_currency(overage_cost),
            participant_multiplier: multiplier,
            total_cost,
            tier_used: limits.tier.clone(),
            date: facts.date,
            supersedes: None,
        })
    }

    /// Overage is billed per language per minute actually active. The
    /// most-used languages fill the included slots; only the least-used are
    /// billed, with ties broken by language code ascending so the split is
    /// deterministic.
    fn overage_cost(&self, facts: &SessionFacts, limits: &EffectiveTierLimits) -> Decimal {
        let included = limits.translation_limit as usize;
        if facts.target_languages.len() <= included {
            return Decimal::ZERO;
        }

        let mut ranked: Vec<(&LanguageCode, u32)> = facts
            .target_languages
            .iter()
            .map(|lang| (lang, facts.active_minutes_for(lang)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        ranked
            .iter()
            .skip(included)
            .map(|(_, minutes)| {
                limits.overage_rate_per_hour * Decimal::from(*minutes) / MINUTES_PER_HOUR
            })
            .sum()
    }

    /// Step function of participant count: one extra bracket per
    /// `increment_size` participants above `base_threshold`, capped at
    /// `max_multiplier` when configured.
    pub fn participant_multiplier(&self, participant_count: u32) -> Decimal {
        let over = participant_count.saturating_sub(self.scaling.base_threshold);
        if over == 0 {
            return Decimal::ONE;
        }
        let brackets = over.div_ceil(self.scaling.increment_size);
        let multiplier = Decimal::ONE + Decimal::from(brackets) * self.scaling.multiplier_rate;
        match self.scaling.max_multiplier {
            Some(cap) => multiplier.min(cap),
            None => multiplier,
        }
    }
}

/// Round to currency-minor-unit precision (2 decimals), half-up.
fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
