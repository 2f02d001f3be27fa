//! Ledger Store Ports
//!
//! The ledger reads and writes its aggregates through these traits. Two
//! adapters implement them: the PostgreSQL adapter in `infra_db` and the
//! in-memory adapter in [`crate::adapters`].
//!
//! # Transactions
//!
//! Writes that must land together go through an explicit transaction handle
//! obtained from [`UnitOfWork::begin`]. The handle implements every store
//! trait, so code inside a transaction reads and writes exactly as it would
//! against the store, and nothing is visible to other callers until
//! [`LedgerTransaction::commit`].
//!
//! ```rust,ignore
//! let registration = run_in_transaction(store.as_ref(), move |tx| {
//!     Box::pin(async move {
//!         tx.lock_customer(customer_id).await?;
//!         tx.save_payment(&payment).await?;
//!         Ok(payment.id())
//!     })
//! })
//! .await?;
//! ```

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use tracing::warn;

use core_kernel::{
    Currency, CustomerId, DomainPort, HealthCheckable, InvoiceId, Money, PaymentId, PortError,
};

use crate::allocation::Allocation;
use crate::customer::Customer;
use crate::error::LedgerError;
use crate::invoice::Invoice;
use crate::payment::Payment;

#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Inserts or updates a customer
    async fn save_customer(&self, customer: &Customer) -> Result<(), PortError>;

    /// Returns `PortError::NotFound` if the customer does not exist
    async fn find_customer(&self, id: CustomerId) -> Result<Customer, PortError>;

    /// All customers, newest first
    async fn list_customers(&self) -> Result<Vec<Customer>, PortError>;

    async fn count_customers(&self) -> Result<u64, PortError>;
}

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Inserts or updates an invoice
    async fn save_invoice(&self, invoice: &Invoice) -> Result<(), PortError>;

    async fn find_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError>;

    /// OPEN and PARTIAL invoices of a customer, oldest due date first
    ///
    /// Invoices sharing a due date come back in creation order.
    async fn find_open_invoices_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Invoice>, PortError>;

    /// Every invoice of a customer, in creation order
    async fn find_invoices_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Invoice>, PortError>;

    /// All invoices, newest first
    async fn list_invoices(&self) -> Result<Vec<Invoice>, PortError>;

    /// Number of OPEN and PARTIAL invoices
    async fn count_open_invoices(&self) -> Result<u64, PortError>;

    /// Sum of invoice totals, one entry per currency ordered by currency code
    async fn sum_invoice_totals(&self) -> Result<Vec<Money>, PortError>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Inserts or updates a payment
    async fn save_payment(&self, payment: &Payment) -> Result<(), PortError>;

    async fn find_payment(&self, id: PaymentId) -> Result<Payment, PortError>;

    /// Every payment of a customer, in creation order
    async fn find_payments_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Payment>, PortError>;

    /// All payments, newest first
    async fn list_payments(&self) -> Result<Vec<Payment>, PortError>;

    /// Sum of original payment amounts, one entry per currency ordered by currency code
    async fn sum_payment_amounts(&self) -> Result<Vec<Money>, PortError>;
}

#[async_trait]
pub trait AllocationStore: Send + Sync {
    /// Appends an allocation; an existing id is a `PortError::Conflict`
    async fn save_allocation(&self, allocation: &Allocation) -> Result<(), PortError>;

    /// Allocations of a payment, in the order they were made
    async fn find_allocations_by_payment(&self, payment_id: PaymentId) -> Result<Vec<Allocation>, PortError>;

    /// Allocations into an invoice, in the order they were made
    async fn find_allocations_by_invoice(&self, invoice_id: InvoiceId) -> Result<Vec<Allocation>, PortError>;
}

/// An open transaction against the ledger store
///
/// Dropping a handle without calling `commit` discards its writes.
#[async_trait]
pub trait LedgerTransaction: CustomerStore + InvoiceStore + PaymentStore + AllocationStore {
    /// Serializes this transaction against others touching the same customer
    ///
    /// Held until commit or rollback. Returns `PortError::NotFound` if the
    /// customer does not exist.
    async fn lock_customer(&self, customer_id: CustomerId) -> Result<(), PortError>;

    async fn commit(self: Box<Self>) -> Result<(), PortError>;

    async fn rollback(self: Box<Self>) -> Result<(), PortError>;
}

/// Source of transaction handles
#[async_trait]
pub trait UnitOfWork: DomainPort {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, PortError>;
}

/// Everything the ledger services need from a storage backend
pub trait LedgerStore:
    CustomerStore + InvoiceStore + PaymentStore + AllocationStore + UnitOfWork + HealthCheckable
{
}

impl<T> LedgerStore for T where
    T: CustomerStore + InvoiceStore + PaymentStore + AllocationStore + UnitOfWork + HealthCheckable
{
}

/// Future returned by the body of [`run_in_transaction`]
pub type TxFuture<'t, T> = Pin<Box<dyn Future<Output = Result<T, LedgerError>> + Send + 't>>;

/// Runs `body` inside a transaction
///
/// Commits when `body` returns `Ok` and rolls back when it returns `Err`. The
/// body's error is returned even if the rollback itself fails.
pub async fn run_in_transaction<U, T, F>(uow: &U, body: F) -> Result<T, LedgerError>
where
    U: UnitOfWork + ?Sized,
    T: Send,
    F: for<'t> FnOnce(&'t dyn LedgerTransaction) -> TxFuture<'t, T> + Send,
{
    let tx = uow.begin().await?;

    let result = body(tx.as_ref()).await;

    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(error) => {
            warn!(error = %error, "Rolling back ledger transaction");
            if let Err(rollback_error) = tx.rollback().await {
                warn!(error = %rollback_error, "Rollback failed");
            }
            Err(error)
        }
    }
}

/// Folds amounts into one total per currency, ordered by currency code
pub fn totals_by_currency<'a, I>(amounts: I) -> Result<Vec<Money>, PortError>
where
    I: IntoIterator<Item = &'a Money>,
{
    let mut totals: BTreeMap<Currency, Money> = BTreeMap::new();
    for amount in amounts {
        let entry = totals
            .entry(amount.currency())
            .or_insert_with(|| Money::zero(amount.currency()));
        *entry = entry
            .checked_add(amount)
            .map_err(|e| PortError::internal(format!("summing amounts: {e}")))?;
    }
    Ok(totals.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_grouped_by_currency() {
        let amounts = [
            Money::new(100, Currency::USD).unwrap(),
            Money::new(50, Currency::EUR).unwrap(),
            Money::new(25, Currency::USD).unwrap(),
        ];
        let totals = totals_by_currency(&amounts).unwrap();
        assert_eq!(
            totals,
            vec![
                Money::new(50, Currency::EUR).unwrap(),
                Money::new(125, Currency::USD).unwrap(),
            ]
        );
    }

    #[test]
    fn test_totals_of_nothing_is_empty() {
        let none: [Money; 0] = [];
        assert!(totals_by_currency(&none).unwrap().is_empty());
    }
}
