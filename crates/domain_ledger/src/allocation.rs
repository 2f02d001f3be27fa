//! Allocation of payment funds to an invoice
//!
//! [`Allocation::apply`] is the only way funds move between a payment and an
//! invoice. It works on copies of both aggregates and hands back their new
//! states together with the allocation record, so a failure leaves the
//! caller's values untouched and there is nothing to undo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AllocationId, InvoiceId, Money, MoneyError, PaymentId};

use crate::error::LedgerError;
use crate::invoice::Invoice;
use crate::payment::Payment;

/// Immutable record that `amount` moved from a payment into an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAllocation")]
pub struct Allocation {
    id: AllocationId,
    payment_id: PaymentId,
    invoice_id: InvoiceId,
    amount: Money,
    created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawAllocation {
    id: AllocationId,
    payment_id: PaymentId,
    invoice_id: InvoiceId,
    amount: Money,
    created_at: DateTime<Utc>,
}

impl TryFrom<RawAllocation> for Allocation {
    type Error = LedgerError;

    fn try_from(raw: RawAllocation) -> Result<Self, Self::Error> {
        Allocation::restore(raw.id, raw.payment_id, raw.invoice_id, raw.amount, raw.created_at)
    }
}

/// New states produced by a successful allocation
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub payment: Payment,
    pub invoice: Invoice,
    pub allocation: Allocation,
}

impl Allocation {
    /// Debits `payment` and credits `invoice` by `amount`
    ///
    /// # Errors
    ///
    /// - `Validation` if `amount` is zero or the two belong to different customers
    /// - `Money(CurrencyMismatch)` unless payment, invoice and amount share a currency
    /// - any error from [`Payment::use_funds`] or [`Invoice::allocate_payment`]
    pub fn apply(
        id: AllocationId,
        payment: &Payment,
        invoice: &Invoice,
        amount: Money,
        now: DateTime<Utc>,
    ) -> Result<AllocationOutcome, LedgerError> {
        let payment_currency = payment.amount().currency();
        let invoice_currency = invoice.total_amount().currency();
        if payment_currency != invoice_currency {
            return Err(MoneyError::CurrencyMismatch(payment_currency, invoice_currency).into());
        }
        if amount.currency() != payment_currency {
            return Err(MoneyError::CurrencyMismatch(payment_currency, amount.currency()).into());
        }
        if !amount.is_positive() {
            return Err(LedgerError::validation("allocation amount must be greater than zero"));
        }
        if payment.customer_id() != invoice.customer_id() {
            return Err(LedgerError::validation(format!(
                "payment {} and invoice {} belong to different customers",
                payment.id(),
                invoice.id()
            )));
        }

        let mut payment = payment.clone();
        payment.use_funds(amount)?;

        let mut invoice = invoice.clone();
        invoice.allocate_payment(amount, now)?;

        let allocation = Allocation {
            id,
            payment_id: payment.id(),
            invoice_id: invoice.id(),
            amount,
            created_at: now,
        };

        Ok(AllocationOutcome {
            payment,
            invoice,
            allocation,
        })
    }

    /// Rebuilds an allocation from stored fields
    pub fn restore(
        id: AllocationId,
        payment_id: PaymentId,
        invoice_id: InvoiceId,
        amount: Money,
        created_at: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::validation(format!("allocation {id} has a zero amount")));
        }
        Ok(Self {
            id,
            payment_id,
            invoice_id,
            amount,
            created_at,
        })
    }

    pub fn id(&self) -> AllocationId {
        self.id
    }

    pub fn payment_id(&self) -> PaymentId {
        self.payment_id
    }

    pub fn invoice_id(&self) -> InvoiceId {
        self.invoice_id
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
