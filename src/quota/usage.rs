//! Free-tier daily-minutes tracking.
//!
//! The counter is shared mutable state at the store boundary: two devices of
//! the same customer may start sessions concurrently, so consumption uses a
//! compare-and-swap loop and the scheduled reset is idempotent within a
//! window. The engine itself stays pure; this module is the concurrency-safe
//! adapter the engine reads the counter through.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::{QuotaError, QuotaResult};
use crate::config::{FreeTierConfig, ResetSchedule};

/// Remaining daily minutes for one free-tier customer.
#[derive(Debug)]
pub struct DailyUsage {
    remaining_minutes: AtomicU32,
    /// Epoch seconds of the reset boundary that opened the current window.
    last_reset: AtomicI64,
}

impl DailyUsage {
    pub fn new(daily_minutes: u32, window_start: DateTime<Utc>) -> Self {
        Self {
            remaining_minutes: AtomicU32::new(daily_minutes),
            last_reset: AtomicI64::new(window_start.timestamp()),
        }
    }

    pub fn remaining_minutes(&self) -> u32 {
        self.remaining_minutes.load(Ordering::Acquire)
    }

    /// Fails with [`QuotaError::DailyQuotaExhausted`] once the counter
    /// reaches zero; the error carries the next scheduled reset.
    pub fn check(&self, schedule: &ResetSchedule, now: DateTime<Utc>) -> QuotaResult<()> {
        if self.remaining_minutes() == 0 {
            Err(QuotaError::DailyQuotaExhausted {
                resets_at: schedule.next_boundary_after(now),
            })
        } else {
            Ok(())
        }
    }

    /// Consumes up to `minutes` from the counter via compare-and-swap, so
    /// two concurrent session starts cannot both spend the same allowance.
    /// Returns the minutes remaining after the decrement.
    pub fn try_consume(
        &self,
        minutes: u32,
        schedule: &ResetSchedule,
        now: DateTime<Utc>,
    ) -> QuotaResult<u32> {
        let mut current = self.remaining_minutes.load(Ordering::Acquire);
        loop {
            if current == 0 {
                return Err(QuotaError::DailyQuotaExhausted {
                    resets_at: schedule.next_boundary_after(now),
                });
            }
            let next = current.saturating_sub(minutes);
            match self.remaining_minutes.compare_exchange(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(next),
                Err(observed) => current = observed,
            }
        }
    }

    /// Refills the counter when a new reset window has opened. Idempotent:
    /// applying it twice within the same window is a no-op, and only one of
    /// two concurrent callers wins the boundary compare-exchange.
    pub fn apply_reset(
        &self,
        schedule: &ResetSchedule,
        daily_minutes: u32,
        now: DateTime<Utc>,
    ) -> bool {
        let boundary = schedule.boundary_on_or_before(now).timestamp();
        let last = self.last_reset.load(Ordering::Acquire);
        if last >= boundary {
            return false;
        }
        if self
            .last_reset
            .compare_exchange(last, boundary, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.remaining_minutes
                .store(daily_minutes, Ordering::Release);
            tracing::debug!(boundary, "free-tier allowance reset");
            true
        } else {
            false
        }
    }
}

/// Per-customer registry of daily usage counters.
#[derive(Debug, Clone, Default)]
pub struct UsageRegistry {
    usage: Arc<DashMap<String, Arc<DailyUsage>>>,
}

impl UsageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter for `customer_id`, created full on first sight and refilled
    /// when a new window has opened since the last call.
    pub fn current(
        &self,
        customer_id: &str,
        free_tier: &FreeTierConfig,
        now: DateTime<Utc>,
    ) -> Arc<DailyUsage> {
        let usage = self
            .usage
            .entry(customer_id.to_string())
            .or_insert_with(|| {
                Arc::new(DailyUsage::new(
                    free_tier.daily_minutes,
                    free_tier.reset.boundary_on_or_before(now),
                ))
            })
            .clone();
        usage.apply_reset(&free_tier.reset, free_tier.daily_minutes, now);
        usage
    }

    pub fn get(&self, customer_id: &str) -> Option<Arc<DailyUsage>> {
        self.usage.get(customer_id).map(|v| Arc::clone(&v))
    }
}
