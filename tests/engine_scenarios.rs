//! Engine Acceptance Scenarios
//!
//! End-to-end flows through the public engine surface: configuration
//! validation, tier resolution, quota gating, cost computation, tier lock-in
//! and invoice aggregation.
//!
//! Run: cargo test --test engine_scenarios

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use lingua_billing::prelude::*;
use lingua_billing::{
    ConfigError, CostError, InvoiceError, TierError, ValidationErrors,
};
use rust_decimal_macros::dec;
use uuid::Uuid;

fn engine() -> PricingEngine {
    PricingEngine::new(ConfigStore::builtin().expect("builtin config is valid"))
}

fn utc(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn languages(codes: &[&str]) -> BTreeSet<String> {
    codes.iter().map(|c| c.to_string()).collect()
}

fn facts(targets: &[(&str, u32)], participants: u32, hours: &str) -> SessionFacts {
    SessionFacts {
        session_id: Uuid::new_v4(),
        duration_hours: hours.parse().unwrap(),
        source_language: "en".to_string(),
        target_languages: targets.iter().map(|(l, _)| l.to_string()).collect(),
        participant_count: participants,
        active_minutes: targets.iter().map(|(l, m)| (l.to_string(), *m)).collect(),
        date: date("2026-03-10"),
    }
}

// =============================================================================
// Configuration
// =============================================================================

mod config_scenarios {
    use super::*;

    #[test]
    fn test_load_reports_every_violation() {
        let mut config = PricingConfiguration::builtin();
        config.free_tier.total_language_limit = 9;
        config.participant_scaling.base_threshold = 0;
        if let Some(tier) = config.payg_tiers.get_mut("business") {
            tier.base_rate_per_hour = dec!(-5);
            tier.total_language_limit = 99;
        }

        match ConfigStore::new(config).unwrap_err() {
            ConfigError::ValidationErrors(ValidationErrors(errors)) => {
                assert_eq!(errors.len(), 4);
                let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                assert!(rendered.iter().any(|m| m.contains("free_tier")));
                assert!(rendered.iter().any(|m| m.contains("base_threshold")));
                assert!(rendered.iter().any(|m| m.contains("base_rate_per_hour")));
            }
            other => panic!("expected validation errors, got {other}"),
        }
    }

    #[test]
    fn test_all_tiers_satisfy_language_limit_invariant() {
        let config = PricingConfiguration::builtin();
        assert_eq!(
            config.free_tier.total_language_limit,
            config.free_tier.translation_limit + 1
        );
        for tier in config.payg_tiers.values() {
            assert_eq!(tier.total_language_limit, tier.translation_limit + 1);
        }
    }
}

// =============================================================================
// Quota enforcement
// =============================================================================

mod quota_scenarios {
    use super::*;

    #[test]
    fn test_starter_with_three_languages_reports_excess() {
        let engine = engine();
        let err = engine
            .check_quota(
                &CustomerContext::payg("cust-1"),
                Some(&"starter".to_string()),
                &languages(&["es", "fr", "de"]),
                utc("2026-03-10T10:00:00Z"),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Quota(QuotaError::TooManyLanguages { excess: 2 })
        ));
    }

    #[test]
    fn test_exhausted_free_tier_produces_no_charge() {
        let engine = engine();
        let now = utc("2026-03-10T10:00:00Z");
        let ctx = CustomerContext::free_tier("cust-free");

        // Burn the whole daily allowance.
        let remaining = engine.consume_free_minutes("cust-free", 30, now).unwrap();
        assert_eq!(remaining, 0);

        let err = engine
            .check_quota(&ctx, None, &languages(&["es"]), now)
            .unwrap_err();
        let resets_at = match err {
            EngineError::Quota(QuotaError::DailyQuotaExhausted { resets_at }) => resets_at,
            other => panic!("expected DailyQuotaExhausted, got {other}"),
        };
        assert_eq!(resets_at, utc("2026-03-11T00:00:00Z"));

        // The session never started, so nothing reaches the invoice.
        assert!(engine.invoice("cust-free", date("2026-03-01")).is_none());
    }

    #[test]
    fn test_free_tier_allowance_returns_after_reset() {
        let engine = engine();
        let ctx = CustomerContext::free_tier("cust-free");
        let today = utc("2026-03-10T10:00:00Z");
        engine.consume_free_minutes("cust-free", 30, today).unwrap();
        assert!(engine
            .check_quota(&ctx, None, &languages(&["es"]), today)
            .is_err());

        let tomorrow = utc("2026-03-11T08:00:00Z");
        assert!(engine
            .check_quota(&ctx, None, &languages(&["es"]), tomorrow)
            .is_ok());
    }
}

// =============================================================================
// Cost computation
// =============================================================================

mod cost_scenarios {
    use super::*;

    #[test]
    fn test_professional_overage_scenario_totals_118_50() {
        let engine = engine();
        let ctx = CustomerContext::payg("cust-1");
        let professional = "professional".to_string();

        let facts = facts(
            &[
                ("es", 60),
                ("fr", 60),
                ("de", 60),
                ("it", 60),
                ("pt", 60),
                ("nl", 30),
            ],
            250,
            "1",
        );

        let charge = engine.compute_cost(&ctx, Some(&professional), &facts).unwrap();
        assert_eq!(charge.base_cost, dec!(75.00));
        assert_eq!(charge.overage_cost, dec!(4.00));
        assert_eq!(charge.participant_multiplier, dec!(1.5));
        assert_eq!(charge.total_cost, dec!(118.50));
        assert_eq!(charge.tier_used, TierUsed::Payg(professional));
    }

    #[test]
    fn test_unresolved_tier_cannot_be_quoted() {
        let engine = engine();
        let err = engine
            .compute_cost(
                &CustomerContext::payg("cust-1"),
                None,
                &facts(&[("es", 30)], 10, "1"),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::Cost(CostError::UnresolvedTier)));
    }

    #[test]
    fn test_identical_facts_produce_identical_amounts() {
        let engine = engine();
        let ctx = CustomerContext::payg("cust-1");
        let tier = "business".to_string();
        let facts = facts(
            &[
                ("es", 60),
                ("fr", 50),
                ("de", 40),
                ("it", 30),
                ("pt", 20),
                ("nl", 10),
                ("sv", 5),
                ("da", 4),
                ("fi", 3),
                ("no", 2),
                ("pl", 1),
            ],
            512,
            "2.5",
        );

        let a = engine.compute_cost(&ctx, Some(&tier), &facts).unwrap();
        let b = engine.compute_cost(&ctx, Some(&tier), &facts).unwrap();
        assert_eq!(a.base_cost, b.base_cost);
        assert_eq!(a.overage_cost, b.overage_cost);
        assert_eq!(a.total_cost, b.total_cost);
    }
}

// =============================================================================
// Tier lock-in
// =============================================================================

mod tier_lock_scenarios {
    use super::*;

    #[test]
    fn test_single_change_per_calendar_month() {
        let engine = engine();
        let first_change = engine
            .change_tier(
                &TierLockState::default(),
                &"professional".to_string(),
                0,
                utc("2026-03-05T09:00:00Z"),
            )
            .unwrap();
        assert!(!first_change.clear_language_selection);

        // Locked for the rest of March.
        assert!(!engine.can_change_tier(&first_change.state, utc("2026-03-20T09:00:00Z")));
        let err = engine
            .change_tier(
                &first_change.state,
                &"business".to_string(),
                0,
                utc("2026-03-20T09:00:00Z"),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Tier(TierError::TierLocked { next_change })
                if next_change == date("2026-04-01")
        ));

        // Eligible again on April 1st.
        assert!(engine.can_change_tier(&first_change.state, utc("2026-04-01T00:00:00Z")));
    }

    #[test]
    fn test_locked_tier_overrides_requested_tier() {
        let engine = engine();
        let change = engine
            .change_tier(
                &TierLockState::default(),
                &"starter".to_string(),
                0,
                utc("2026-03-05T09:00:00Z"),
            )
            .unwrap();

        let ctx = CustomerContext::payg("cust-1").with_lock(change.state);
        let resolution = engine
            .resolve_tier(&ctx, Some(&"business".to_string()))
            .unwrap();
        assert_eq!(
            resolution.limits().unwrap().tier,
            TierUsed::Payg("starter".to_string())
        );
    }

    #[test]
    fn test_downgrade_requires_clearing_selection() {
        let engine = engine();
        // 3 languages selected, Starter includes only 1.
        let change = engine
            .change_tier(
                &TierLockState::default(),
                &"starter".to_string(),
                3,
                utc("2026-03-05T09:00:00Z"),
            )
            .unwrap();
        assert!(change.clear_language_selection);
    }
}

// =============================================================================
// Invoicing
// =============================================================================

mod invoice_scenarios {
    use super::*;

    #[test]
    fn test_invoice_total_tracks_charge_sum() {
        let engine = engine();
        let ctx = CustomerContext::payg("cust-1");
        let tier = "professional".to_string();
        let start = date("2026-03-01");
        let end = date("2026-03-31");

        let sessions = [
            facts(&[("es", 60), ("fr", 60), ("de", 60), ("it", 60), ("pt", 60)], 80, "1"),
            facts(&[("es", 30), ("fr", 30), ("de", 30), ("it", 30), ("pt", 30)], 150, "0.5"),
            facts(
                &[("es", 90), ("fr", 80), ("de", 70), ("it", 60), ("pt", 50), ("nl", 15)],
                250,
                "1.5",
            ),
        ];

        let mut expected = dec!(0);
        for session in &sessions {
            let charge = engine.compute_cost(&ctx, Some(&tier), session).unwrap();
            expected += charge.total_cost;
            let total = engine.add_charge("cust-1", start, end, charge).unwrap();
            assert_eq!(total, expected);
        }

        let invoice = engine.invoice("cust-1", start).unwrap();
        assert_eq!(invoice.charges().len(), 3);
        assert_eq!(invoice.total_amount(), expected);
        let recomputed: rust_decimal::Decimal =
            invoice.charges().iter().map(|c| c.total_cost).sum();
        assert_eq!(invoice.total_amount(), recomputed);
    }

    #[test]
    fn test_finalized_invoice_is_immutable() {
        let engine = engine();
        let ctx = CustomerContext::payg("cust-1");
        let start = date("2026-03-01");
        let end = date("2026-03-31");

        let charge = engine
            .compute_cost(
                &ctx,
                Some(&"starter".to_string()),
                &facts(&[("es", 60)], 10, "1"),
            )
            .unwrap();
        engine.add_charge("cust-1", start, end, charge.clone()).unwrap();

        engine.finalize_invoice("cust-1", start).unwrap();
        assert_eq!(
            engine.invoice("cust-1", start).unwrap().status(),
            InvoiceStatus::Paid
        );

        let late = charge.superseded_by(charge.clone());
        let err = engine.add_charge("cust-1", start, end, late).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Invoice(InvoiceError::InvoiceClosed)
        ));
        let err = engine.finalize_invoice("cust-1", start).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Invoice(InvoiceError::AlreadyFinalized)
        ));
    }
}
