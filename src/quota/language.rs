//! Exact-count language selection check.

use std::collections::BTreeSet;

use super::{QuotaError, QuotaResult};
use crate::config::LanguageCode;
use crate::tier::EffectiveTierLimits;

/// A tier specifies an exact translation count, not a ceiling: the selection
/// must contain exactly `translation_limit` target languages. The error
/// carries the delta needed to become valid.
pub fn check_language_selection(
    target_languages: &BTreeSet<LanguageCode>,
    limits: &EffectiveTierLimits,
) -> QuotaResult<()> {
    let selected = target_languages.len() as u32;
    let required = limits.translation_limit;

    if selected < required {
        Err(QuotaError::TooFewLanguages {
            missing: required - selected,
        })
    } else if selected > required {
        Err(QuotaError::TooManyLanguages {
            excess: selected - required,
        })
    } else {
        Ok(())
    }
}
