//! Immutable session inputs and the charge they produce.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::LanguageCode;
use crate::tier::TierUsed;

/// Facts about a completed (or proposed) session, supplied by the session
/// layer. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionFacts {
    pub session_id: Uuid,
    pub duration_hours: Decimal,
    pub source_language: LanguageCode,
    pub target_languages: BTreeSet<LanguageCode>,
    pub participant_count: u32,
    /// Minutes each target language was actually in use, for overage
    /// proration. Languages absent from the map count as zero.
    pub active_minutes: BTreeMap<LanguageCode, u32>,
    pub date: NaiveDate,
}

impl SessionFacts {
    pub fn active_minutes_for(&self, language: &str) -> u32 {
        self.active_minutes.get(language).copied().unwrap_or(0)
    }
}

/// Monetary outcome of one session. Created once at session completion;
/// corrections supersede rather than mutate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCharge {
    pub charge_id: Uuid,
    pub session_id: Uuid,
    pub duration_hours: Decimal,
    pub base_cost: Decimal,
    pub overage_cost: Decimal,
    pub participant_multiplier: Decimal,
    pub total_cost: Decimal,
    pub tier_used: TierUsed,
    pub date: NaiveDate,
    /// Charge this one corrects, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supersedes: Option<Uuid>,
}

impl SessionCharge {
    /// A correcting charge referencing this one as superseded.
    pub fn superseded_by(&self, mut correction: SessionCharge) -> SessionCharge {
        correction.supersedes = Some(self.charge_id);
        correction
    }
}
