//! Billing-period invoices and their status lifecycle.

mod ledger;
mod model;

pub use ledger::{InvoiceKey, InvoiceLedger};
pub use model::{Invoice, InvoiceStatus};

use thiserror::Error;

/// Errors raised by invoice operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvoiceError {
    /// Invoice was already finalized; a paid invoice is immutable
    #[error("Invoice is already finalized")]
    AlreadyFinalized,

    /// Charges can only be added while the invoice is pending
    #[error("Invoice is closed; charges can no longer be added")]
    InvoiceClosed,

    /// No invoice is open for this customer and billing period
    #[error("No invoice found for customer {customer_id}")]
    UnknownInvoice {
        /// The customer whose invoice was requested
        customer_id: String,
    },
}

/// Result type for invoice operations
pub type InvoiceResult<T> = std::result::Result<T, InvoiceError>;
