//! Configuration loading, validation and atomic versioned snapshots.

use std::sync::{Arc, RwLock};

use super::{ConfigError, ConfigResult, PricingConfiguration, ValidationErrors};

/// Holds the active [`PricingConfiguration`] snapshot.
///
/// A snapshot is immutable once installed; [`ConfigStore::install`] replaces
/// the whole `Arc` atomically so readers never observe a partially-validated
/// configuration.
#[derive(Debug)]
pub struct ConfigStore {
    current: RwLock<Arc<PricingConfiguration>>,
}

impl ConfigStore {
    /// Validates `config` and installs it as the initial snapshot.
    pub fn new(config: PricingConfiguration) -> ConfigResult<Self> {
        validate(&config)?;
        Ok(Self {
            current: RwLock::new(Arc::new(config)),
        })
    }

    /// Parses a JSON configuration document, then validates it.
    pub fn load(raw: &str) -> ConfigResult<Self> {
        let config: PricingConfiguration = serde_json::from_str(raw)?;
        Self::new(config)
    }

    /// Store seeded with the built-in reference configuration.
    pub fn builtin() -> ConfigResult<Self> {
        Self::new(PricingConfiguration::builtin())
    }

    /// Current configuration snapshot.
    pub fn get(&self) -> Arc<PricingConfiguration> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Validates and atomically installs a new configuration version.
    /// The previous snapshot stays valid for readers that already hold it.
    pub fn install(&self, config: PricingConfiguration) -> ConfigResult<()> {
        validate(&config)?;
        let version = config.version;
        let next = Arc::new(config);
        match self.current.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        tracing::debug!(version, "installed pricing configuration");
        Ok(())
    }
}

/// Checks every §invariant of the configuration and reports all violations
/// at once.
fn validate(config: &PricingConfiguration) -> ConfigResult<()> {
    let errors = collect_violations(config);
    if errors.is_empty() {
        Ok(())
    } else {
        tracing::warn!(
            violations = errors.len(),
            "rejected pricing configuration"
        );
        Err(ConfigError::ValidationErrors(ValidationErrors(errors)))
    }
}

fn collect_violations(config: &PricingConfiguration) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    let mut invalid = |key: &str, message: String| {
        errors.push(ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        });
    };

    if config.currency.trim().is_empty() {
        invalid("currency", "currency code must not be empty".to_string());
    }

    let free = &config.free_tier;
    if free.daily_minutes == 0 {
        invalid(
            "free_tier.daily_minutes",
            "must be greater than zero".to_string(),
        );
    }
    if free.total_language_limit != free.translation_limit + 1 {
        invalid(
            "free_tier.total_language_limit",
            format!(
                "must equal translation_limit + 1 ({} != {} + 1)",
                free.total_language_limit, free.translation_limit
            ),
        );
    }

    for (tier_id, tier) in &config.payg_tiers {
        if tier.base_rate_per_hour <= rust_decimal::Decimal::ZERO {
            invalid(
                &format!("payg_tiers.{tier_id}.base_rate_per_hour"),
                format!("must be greater than zero, got {}", tier.base_rate_per_hour),
            );
        }
        if tier.overage_rate_per_hour < rust_decimal::Decimal::ZERO {
            invalid(
                &format!("payg_tiers.{tier_id}.overage_rate_per_hour"),
                format!("must not be negative, got {}", tier.overage_rate_per_hour),
            );
        }
        if tier.total_language_limit != tier.translation_limit + 1 {
            invalid(
                &format!("payg_tiers.{tier_id}.total_language_limit"),
                format!(
                    "must equal translation_limit + 1 ({} != {} + 1)",
                    tier.total_language_limit, tier.translation_limit
                ),
            );
        }
    }

    let scaling = &config.participant_scaling;
    if scaling.base_threshold == 0 {
        invalid(
            "participant_scaling.base_threshold",
            "must be greater than zero".to_string(),
        );
    }
    if scaling.increment_size == 0 {
        invalid(
            "participant_scaling.increment_size",
            "must be greater than zero".to_string(),
        );
    }
    if scaling.multiplier_rate < rust_decimal::Decimal::ZERO {
        invalid(
            "participant_scaling.multiplier_rate",
            format!("must not be negative, got {}", scaling.multiplier_rate),
        );
    }
    if let Some(max) = scaling.max_multiplier
        && max < rust_decimal::Decimal::ONE
    {
        invalid(
            "participant_scaling.max_multiplier",
            format!("must be at least 1, got {max}"),
        );
    }

    errors
}
