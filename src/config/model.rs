//! Pricing configuration value types.
//!
//! A [`PricingConfiguration`] is parsed from a structured document, validated
//! as a whole, and then treated as immutable for the lifetime of its version.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Identifier of a pay-as-you-go tier (e.g. `"professional"`).
pub type TierId = String;

/// BCP 47-style language code (e.g. `"es"`, `"pt-BR"`).
pub type LanguageCode = String;

/// Root of the versioned pricing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfiguration {
    pub version: u32,
    /// ISO 4217 currency code applied to all rates and invoices.
    pub currency: String,
    /// Offset used for billing-calendar computations (tier lock-in months).
    #[serde(with = "tz_offset")]
    pub billing_timezone: FixedOffset,
    pub free_tier: FreeTierConfig,
    pub payg_tiers: BTreeMap<TierId, PaygTier>,
    pub participant_scaling: ParticipantScaling,
}

/// Daily free allowance with a scheduled reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeTierConfig {
    /// Minutes of session time included per reset window.
    pub daily_minutes: u32,
    /// Target languages included (excludes the source language).
    pub translation_limit: u32,
    /// `translation_limit` plus the source language.
    pub total_language_limit: u32,
    pub reset: ResetSchedule,
}

/// A pay-as-you-go pricing plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaygTier {
    pub base_rate_per_hour: Decimal,
    pub translation_limit: u32,
    pub total_language_limit: u32,
    /// Rate per extra target language per hour of active use.
    pub overage_rate_per_hour: Decimal,
}

/// Step-function rate increase for large sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantScaling {
    /// Participant count included in the base rate.
    pub base_threshold: u32,
    /// Participants per additional multiplier bracket.
    pub increment_size: u32,
    /// Multiplier added per bracket above the threshold.
    pub multiplier_rate: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_multiplier: Option<Decimal>,
}

/// When and how often the free-tier minute counter resets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetSchedule {
    pub schedule: ResetInterval,
    /// Local wall-clock time of the reset in `timezone`.
    pub time: NaiveTime,
    #[serde(with = "tz_offset")]
    pub timezone: FixedOffset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetInterval {
    Daily,
}

impl ResetSchedule {
    /// Most recent reset boundary at or before `now`.
    pub fn boundary_on_or_before(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local_date = now.with_timezone(&self.timezone).date_naive();
        match self.localize(local_date) {
            Some(candidate) if candidate <= now => candidate,
            _ => self
                .localize(local_date - Duration::days(1))
                .unwrap_or(now),
        }
    }

    /// Next reset boundary strictly after `now`.
    pub fn next_boundary_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.boundary_on_or_before(now) + Duration::days(1)
    }

    fn localize(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        self.timezone
            .from_local_datetime(&date.and_time(self.time))
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl PricingConfiguration {
    /// Reference configuration mirroring the published price sheet. Used as
    /// a starting point in examples and tests; production deployments load
    /// their own document through [`super::ConfigStore::load`].
    pub fn builtin() -> Self {
        let utc = chrono::Utc.fix();
        Self {
            version: 1,
            currency: "USD".to_string(),
            billing_timezone: utc,
            free_tier: FreeTierConfig {
                daily_minutes: 30,
                translation_limit: 1,
                total_language_limit: 2,
                reset: ResetSchedule {
                    schedule: ResetInterval::Daily,
                    time: NaiveTime::MIN,
                    timezone: utc,
                },
            },
            payg_tiers: BTreeMap::from([
                (
                    "starter".to_string(),
                    PaygTier {
                        base_rate_per_hour: dec!(25),
                        translation_limit: 1,
                        total_language_limit: 2,
                        overage_rate_per_hour: dec!(10),
                    },
                ),
                (
                    "professional".to_string(),
                    PaygTier {
                        base_rate_per_hour: dec!(75),
                        translation_limit: 5,
                        total_language_limit: 6,
                        overage_rate_per_hour: dec!(8),
                    },
                ),
                (
                    "business".to_string(),
                    PaygTier {
                        base_rate_per_hour: dec!(150),
                        translation_limit: 10,
                        total_language_limit: 11,
                        overage_rate_per_hour: dec!(6),
                    },
                ),
            ]),
            participant_scaling: ParticipantScaling {
                base_threshold: 100,
                increment_size: 100,
                multiplier_rate: dec!(0.25),
                max_multiplier: Some(dec!(3)),
            },
        }
    }
}

/// Serde adapter for fixed UTC offsets rendered as `"+09:00"`.
pub(crate) mod tz_offset {
    use chrono::FixedOffset;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(offset: &FixedOffset, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(offset)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<FixedOffset, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}
