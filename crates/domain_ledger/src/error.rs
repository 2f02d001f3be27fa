//! Ledger domain errors
//!
//! Entity and allocation failures are distinct variants so callers can react
//! to each one. Money and storage failures are carried through unchanged.

use thiserror::Error;

use core_kernel::{CustomerId, InvoiceId, MoneyError, PaymentId, PortError};

/// Errors that can occur in the ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A stored invoice's status disagrees with its amounts
    #[error("Invalid invoice state for {invoice_id}: {reason}")]
    InvalidInvoiceState {
        invoice_id: InvoiceId,
        reason: String,
    },

    /// Funds were applied to an invoice that is PAID or VOID
    #[error("Invoice {0} is already settled")]
    InvoiceAlreadyPaid(InvoiceId),

    /// The allocation exceeds the invoice's remaining amount
    #[error("Overpayment not allowed on {invoice_id}: remaining {remaining}, attempted {attempted}")]
    OverpaymentNotAllowed {
        invoice_id: InvoiceId,
        remaining: i64,
        attempted: i64,
    },

    /// The allocation exceeds the payment's available balance
    #[error("Insufficient balance on {payment_id}: available {available}, requested {requested}")]
    InsufficientPaymentBalance {
        payment_id: PaymentId,
        available: i64,
        requested: i64,
    },

    /// A stored payment's available balance exceeds its original amount
    #[error("Payment {payment_id} available amount {available} exceeds original amount {amount}")]
    PaymentAmountMismatch {
        payment_id: PaymentId,
        amount: i64,
        available: i64,
    },

    /// The referenced customer does not exist
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// Input rejected before touching storage
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Port(#[from] PortError),
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }

    /// True for errors caused by the caller's input rather than by storage
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            LedgerError::Port(PortError::Connection { .. })
                | LedgerError::Port(PortError::Internal { .. })
                | LedgerError::Port(PortError::Transformation { .. })
                | LedgerError::InvalidInvoiceState { .. }
                | LedgerError::PaymentAmountMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_error_converts() {
        let err: LedgerError = MoneyError::NegativeAmount(-5).into();
        assert!(matches!(err, LedgerError::Money(MoneyError::NegativeAmount(-5))));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_storage_failure_is_not_client_error() {
        let err: LedgerError = PortError::connection("pool timed out").into();
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_not_found_is_client_error() {
        let err: LedgerError = PortError::not_found("Invoice", "INV-1").into();
        assert!(err.is_client_error());
    }
}
