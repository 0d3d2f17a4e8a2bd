//! Once-per-billing-month tier-change rule.
//!
//! A tier selection made in a calendar month locks the customer to that tier
//! until the first day of the following month, measured in the configured
//! billing timezone. The lock manager only decides eligibility and produces
//! the new lock state; clearing an oversized language selection and any
//! recalculation are the caller's responsibility.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{TierError, TierResult};
use crate::config::{PricingConfiguration, TierId};

/// Per-customer tier selection state, persisted externally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierLockState {
    pub current_tier: Option<TierId>,
    pub selected_on: Option<DateTime<Utc>>,
}

/// Outcome of a successful tier change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierChange {
    pub state: TierLockState,
    /// True when the new tier includes fewer target languages than the
    /// customer currently has selected; the caller must clear the selection.
    pub clear_language_selection: bool,
}

/// Enforces the tier lock-in against the billing calendar.
pub struct TierLockManager {
    billing_timezone: FixedOffset,
}

impl TierLockManager {
    pub fn new(billing_timezone: FixedOffset) -> Self {
        Self { billing_timezone }
    }

    pub fn for_config(config: &PricingConfiguration) -> Self {
        Self::new(config.billing_timezone)
    }

    /// True when no selection exists yet, or the last selection happened
    /// strictly before the first day of the current billing month.
    pub fn can_change_tier(&self, state: &TierLockState, now: DateTime<Utc>) -> bool {
        match state.selected_on {
            None => true,
            Some(selected_on) => {
                let selected_local = selected_on.with_timezone(&self.billing_timezone).date_naive();
                selected_local < first_of_month(self.local_date(now))
            }
        }
    }

    /// First day of the next billing month, when a locked customer becomes
    /// eligible again.
    pub fn next_change_date(&self, now: DateTime<Utc>) -> NaiveDate {
        first_of_next_month(self.local_date(now))
    }

    /// Records a tier change, or fails with [`TierError::TierLocked`]
    /// carrying the next eligible date.
    pub fn change_tier(
        &self,
        state: &TierLockState,
        new_tier: &TierId,
        selected_language_count: u32,
        config: &PricingConfiguration,
        now: DateTime<Utc>,
    ) -> TierResult<TierChange> {
        if !self.can_change_tier(state, now) {
            return Err(TierError::TierLocked {
                next_change: self.next_change_date(now),
            });
        }

        let tier = config
            .payg_tiers
            .get(new_tier)
            .ok_or_else(|| TierError::UnknownTier {
                tier_id: new_tier.clone(),
            })?;

        tracing::debug!(tier = %new_tier, "tier change recorded");
        Ok(TierChange {
            state: TierLockState {
                current_tier: Some(new_tier.clone()),
                selected_on: Some(now),
            },
            clear_language_selection: tier.translation_limit < selected_language_count,
        })
    }

    fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.billing_timezone).date_naive()
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}
