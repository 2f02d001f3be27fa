//! Invoice entity and its payment state machine
//!
//! ```text
//!   OPEN ──allocate──▶ PARTIAL ──allocate──▶ PAID
//!     └────────────allocate (full)───────────▲
//!   VOID  (terminal, never allocated to)
//! ```
//!
//! The status is always derived from `paid_amount` against `total_amount`,
//! except for VOID which is only ever loaded from storage.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CustomerId, InvoiceId, Money, MoneyError};

use crate::error::LedgerError;

/// Invoice payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceStatus {
    /// Nothing paid yet
    Open,
    /// Some but not all of the total paid
    Partial,
    /// Fully settled
    Paid,
    /// Cancelled, excluded from allocation
    Void,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Open => "OPEN",
            InvoiceStatus::Partial => "PARTIAL",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Void => "VOID",
        }
    }

    /// True if the invoice can still receive funds
    pub fn is_open(&self) -> bool {
        matches!(self, InvoiceStatus::Open | InvoiceStatus::Partial)
    }

    /// Status implied by the paid and total amounts
    fn derive(paid: &Money, total: &Money) -> Self {
        if paid == total {
            InvoiceStatus::Paid
        } else if paid.is_positive() {
            InvoiceStatus::Partial
        } else {
            InvoiceStatus::Open
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(InvoiceStatus::Open),
            "PARTIAL" => Ok(InvoiceStatus::Partial),
            "PAID" => Ok(InvoiceStatus::Paid),
            "VOID" => Ok(InvoiceStatus::Void),
            other => Err(LedgerError::validation(format!("unknown invoice status '{other}'"))),
        }
    }
}

/// A debt owed by a customer
///
/// # Invariants
///
/// - `total_amount` and `paid_amount` share a currency
/// - `0 <= paid_amount <= total_amount`
/// - `status` matches the amounts unless it is VOID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawInvoice")]
pub struct Invoice {
    id: InvoiceId,
    customer_id: CustomerId,
    total_amount: Money,
    paid_amount: Money,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    status: InvoiceStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawInvoice {
    id: InvoiceId,
    customer_id: CustomerId,
    total_amount: Money,
    paid_amount: Money,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    status: InvoiceStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RawInvoice> for Invoice {
    type Error = LedgerError;

    fn try_from(raw: RawInvoice) -> Result<Self, Self::Error> {
        Invoice::restore(
            raw.id,
            raw.customer_id,
            raw.total_amount,
            raw.paid_amount,
            raw.issue_date,
            raw.due_date,
            raw.status,
            raw.created_at,
            raw.updated_at,
        )
    }
}

impl Invoice {
    /// Creates a fresh invoice in OPEN state
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if the total is zero.
    pub fn new(
        id: InvoiceId,
        customer_id: CustomerId,
        total_amount: Money,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        if !total_amount.is_positive() {
            return Err(LedgerError::validation("invoice total must be greater than zero"));
        }

        Ok(Self {
            id,
            customer_id,
            total_amount,
            paid_amount: Money::zero(total_amount.currency()),
            issue_date,
            due_date,
            status: InvoiceStatus::Open,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds an invoice from stored fields, checking every invariant
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidInvoiceState` if the amounts or the
    /// status are inconsistent.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: InvoiceId,
        customer_id: CustomerId,
        total_amount: Money,
        paid_amount: Money,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        status: InvoiceStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        let invalid = |reason: String| LedgerError::InvalidInvoiceState {
            invoice_id: id,
            reason,
        };

        if !total_amount.same_currency(&paid_amount) {
            return Err(invalid(format!(
                "total is in {} but paid is in {}",
                total_amount.currency(),
                paid_amount.currency()
            )));
        }
        if paid_amount.amount() > total_amount.amount() {
            return Err(invalid(format!(
                "paid {} exceeds total {}",
                paid_amount.amount(),
                total_amount.amount()
            )));
        }
        if status != InvoiceStatus::Void {
            let expected = InvoiceStatus::derive(&paid_amount, &total_amount);
            if status != expected {
                return Err(invalid(format!("status {status} should be {expected}")));
            }
        }

        Ok(Self {
            id,
            customer_id,
            total_amount,
            paid_amount,
            issue_date,
            due_date,
            status,
            created_at,
            updated_at,
        })
    }

    pub fn id(&self) -> InvoiceId {
        self.id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn paid_amount(&self) -> Money {
        self.paid_amount
    }

    pub fn issue_date(&self) -> NaiveDate {
        self.issue_date
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Amount still owed, never negative
    pub fn remaining_amount(&self) -> Money {
        self.total_amount
            .checked_sub(&self.paid_amount)
            .unwrap_or_else(|_| Money::zero(self.total_amount.currency()))
    }

    /// Open or partially paid and past its due date
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status.is_open() && self.due_date < today
    }

    /// Applies funds to this invoice and recomputes its status
    ///
    /// # Errors
    ///
    /// - `InvoiceAlreadyPaid` if the invoice is PAID or VOID
    /// - `Money(CurrencyMismatch)` if the currencies differ
    /// - `OverpaymentNotAllowed` if `amount` exceeds the remaining amount
    pub fn allocate_payment(&mut self, amount: Money, now: DateTime<Utc>) -> Result<(), LedgerError> {
        if !self.status.is_open() {
            return Err(LedgerError::InvoiceAlreadyPaid(self.id));
        }
        if !amount.same_currency(&self.total_amount) {
            return Err(MoneyError::CurrencyMismatch(self.total_amount.currency(), amount.currency()).into());
        }

        let remaining = self.remaining_amount();
        if amount.greater_than(&remaining)? {
            return Err(LedgerError::OverpaymentNotAllowed {
                invoice_id: self.id,
                remaining: remaining.amount(),
                attempted: amount.amount(),
            });
        }

        self.paid_amount = self.paid_amount.checked_add(&amount)?;
        self.status = InvoiceStatus::derive(&self.paid_amount, &self.total_amount);
        self.updated_at = now;
        Ok(())
    }
}
