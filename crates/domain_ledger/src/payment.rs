//! Payment entity
//!
//! A payment is a credit received from a customer. Its original amount never
//! changes; the available balance shrinks as funds are allocated.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CustomerId, Money, MoneyError, PaymentId};

use crate::error::LedgerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPayment")]
pub struct Payment {
    id: PaymentId,
    customer_id: CustomerId,
    amount: Money,
    available_amount: Money,
    date: NaiveDate,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawPayment {
    id: PaymentId,
    customer_id: CustomerId,
    amount: Money,
    available_amount: Money,
    date: NaiveDate,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<RawPayment> for Payment {
    type Error = LedgerError;

    fn try_from(raw: RawPayment) -> Result<Self, Self::Error> {
        Payment::restore(
            raw.id,
            raw.customer_id,
            raw.amount,
            raw.available_amount,
            raw.date,
            raw.notes,
            raw.created_at,
        )
    }
}

impl Payment {
    /// Creates a payment whose whole amount is available
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if the amount is zero.
    pub fn new(
        id: PaymentId,
        customer_id: CustomerId,
        amount: Money,
        date: NaiveDate,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::validation("payment amount must be greater than zero"));
        }

        Ok(Self {
            id,
            customer_id,
            amount,
            available_amount: amount,
            date,
            notes: notes.filter(|n| !n.trim().is_empty()),
            created_at: now,
        })
    }

    /// Rebuilds a payment from stored fields
    ///
    /// # Errors
    ///
    /// - `Money(CurrencyMismatch)` if the two amounts differ in currency
    /// - `PaymentAmountMismatch` if more is available than was ever paid
    pub fn restore(
        id: PaymentId,
        customer_id: CustomerId,
        amount: Money,
        available_amount: Money,
        date: NaiveDate,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        if !amount.same_currency(&available_amount) {
            return Err(MoneyError::CurrencyMismatch(amount.currency(), available_amount.currency()).into());
        }
        if available_amount.greater_than(&amount)? {
            return Err(LedgerError::PaymentAmountMismatch {
                payment_id: id,
                amount: amount.amount(),
                available: available_amount.amount(),
            });
        }

        Ok(Self {
            id,
            customer_id,
            amount,
            available_amount,
            date,
            notes,
            created_at,
        })
    }

    pub fn id(&self) -> PaymentId {
        self.id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Original amount received
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Portion not yet allocated to invoices
    pub fn available_amount(&self) -> Money {
        self.available_amount
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Sum already allocated to invoices
    pub fn allocated_amount(&self) -> Money {
        self.amount
            .checked_sub(&self.available_amount)
            .unwrap_or_else(|_| Money::zero(self.amount.currency()))
    }

    /// Deducts `amount` from the available balance
    ///
    /// # Errors
    ///
    /// - `Money(CurrencyMismatch)` if the currencies differ
    /// - `InsufficientPaymentBalance` if `amount` exceeds what is available
    pub fn use_funds(&mut self, amount: Money) -> Result<(), LedgerError> {
        if !amount.same_currency(&self.available_amount) {
            return Err(MoneyError::CurrencyMismatch(self.available_amount.currency(), amount.currency()).into());
        }
        if amount.greater_than(&self.available_amount)? {
            return Err(LedgerError::InsufficientPaymentBalance {
                payment_id: self.id,
                available: self.available_amount.amount(),
                requested: amount.amount(),
            });
        }

        self.available_amount = self.available_amount.checked_sub(&amount)?;
        Ok(())
    }
}
