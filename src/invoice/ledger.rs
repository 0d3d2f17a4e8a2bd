//! Per-customer, per-period invoice registry.
//!
//! `add_charge` recomputes an aggregate from a mutable collection, so
//! appends must not race. The ledger hands out exclusive access per invoice
//! through the map's entry guards, which serializes concurrent appends to
//! the same customer/period while leaving other invoices untouched.

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use rust_decimal::Decimal;

use super::{Invoice, InvoiceError, InvoiceResult};
use crate::cost::SessionCharge;

/// One invoice per customer per billing period.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvoiceKey {
    pub customer_id: String,
    pub period_start: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct InvoiceLedger {
    invoices: Arc<DashMap<InvoiceKey, Invoice>>,
}

impl InvoiceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the invoice for a customer and period if none exists yet.
    pub fn open(
        &self,
        customer_id: &str,
        period_start: NaiveDate,
        period_end: NaiveDate,
        currency: impl Into<String>,
    ) {
        self.invoices
            .entry(key(customer_id, period_start))
            .or_insert_with(|| Invoice::new(period_start, period_end, currency));
    }

    /// Appends a charge to the customer's invoice for the period and returns
    /// the recomputed total.
    pub fn add_charge(
        &self,
        customer_id: &str,
        period_start: NaiveDate,
        charge: SessionCharge,
    ) -> InvoiceResult<Decimal> {
        let mut entry = self
            .invoices
            .get_mut(&key(customer_id, period_start))
            .ok_or_else(|| unknown(customer_id))?;
        entry.value_mut().add_charge(charge)
    }

    /// Finalizes the customer's invoice for the period.
    pub fn finalize(&self, customer_id: &str, period_start: NaiveDate) -> InvoiceResult<()> {
        let mut entry = self
            .invoices
            .get_mut(&key(customer_id, period_start))
            .ok_or_else(|| unknown(customer_id))?;
        entry.value_mut().finalize()
    }

    /// Point-in-time copy of an invoice, for display or persistence.
    pub fn snapshot(&self, customer_id: &str, period_start: NaiveDate) -> Option<Invoice> {
        self.invoices
            .get(&key(customer_id, period_start))
            .map(|entry| entry.value().clone())
    }
}

fn key(customer_id: &str, period_start: NaiveDate) -> InvoiceKey {
    InvoiceKey {
        customer_id: customer_id.to_string(),
        period_start,
    }
}

fn unknown(customer_id: &str) -> InvoiceError {
    InvoiceError::UnknownInvoice {
        customer_id: customer_id.to_string(),
    }
}
