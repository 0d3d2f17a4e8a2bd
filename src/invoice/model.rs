//! Invoice value type.
//!
//! The total is never cached independently of the charges: it is recomputed
//! from the charge list on every read, so it cannot drift from the sum.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{InvoiceError, InvoiceResult};
use crate::cost::SessionCharge;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Failed,
}

/// Session charges aggregated over one billing period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub currency: String,
    charges: Vec<SessionCharge>,
    status: InvoiceStatus,
}

impl Invoice {
    pub fn new(period_start: NaiveDate, period_end: NaiveDate, currency: impl Into<String>) -> Self {
        Self {
            period_start,
            period_end,
            currency: currency.into(),
            charges: Vec::new(),
            status: InvoiceStatus::Pending,
        }
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn charges(&self) -> &[SessionCharge] {
        &self.charges
    }

    /// Sum of all charge totals, recomputed on every call.
    pub fn total_amount(&self) -> Decimal {
        self.charges.iter().map(|c| c.total_cost).sum()
    }

    /// Appends a charge. Only a pending invoice accepts charges.
    pub fn add_charge(&mut self, charge: SessionCharge) -> InvoiceResult<Decimal> {
        match self.status {
            InvoiceStatus::Pending => {
                self.charges.push(charge);
                Ok(self.total_amount())
            }
            InvoiceStatus::Paid | InvoiceStatus::Failed => Err(InvoiceError::InvoiceClosed),
        }
    }

    /// Transitions `pending -> paid`, exactly once. A paid invoice is
    /// immutable afterwards.
    pub fn finalize(&mut self) -> InvoiceResult<()> {
        match self.status {
            InvoiceStatus::Pending => {
                self.status = InvoiceStatus::Paid;
                tracing::debug!(
                    period_start = %self.period_start,
                    total = %self.total_amount(),
                    "invoice finalized"
                );
                Ok(())
            }
            InvoiceStatus::Paid => Err(InvoiceError::AlreadyFinalized),
            InvoiceStatus::Failed => Err(InvoiceError::InvoiceClosed),
        }
    }

    /// Records a failed payment attempt on a pending invoice.
    pub fn mark_failed(&mut self) -> InvoiceResult<()> {
        match self.status {
            InvoiceStatus::Pending => {
                self.status = InvoiceStatus::Failed;
                Ok(())
            }
            InvoiceStatus::Paid => Err(InvoiceError::AlreadyFinalized),
            InvoiceStatus::Failed => Err(InvoiceError::InvoiceClosed),
        }
    }
}
