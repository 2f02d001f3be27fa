//! In-memory ledger store
//!
//! Keeps every aggregate in process memory. Used for local runs and tests.
//!
//! A transaction takes the store-wide lock for its whole lifetime and writes
//! to a private copy of the state, which replaces the shared state on commit.
//! Transactions are therefore fully serialized, which also covers the
//! per-customer serialization the allocation engine needs.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};
use tracing::debug;

use core_kernel::{
    AdapterHealth, CustomerId, DomainPort, HealthCheckResult, HealthCheckable, InvoiceId, Money,
    PaymentId, PortError,
};

use crate::allocation::Allocation;
use crate::customer::Customer;
use crate::invoice::Invoice;
use crate::payment::Payment;
use crate::ports::{
    totals_by_currency, AllocationStore, CustomerStore, InvoiceStore, LedgerTransaction,
    PaymentStore, UnitOfWork,
};

/// Everything the store holds, in insertion order
#[derive(Debug, Clone, Default)]
struct LedgerState {
    customers: Vec<Customer>,
    invoices: Vec<Invoice>,
    payments: Vec<Payment>,
    allocations: Vec<Allocation>,
}

impl LedgerState {
    fn upsert_customer(&mut self, customer: &Customer) {
        match self.customers.iter_mut().find(|c| c.id() == customer.id()) {
            Some(existing) => *existing = customer.clone(),
            None => self.customers.push(customer.clone()),
        }
    }

    fn customer(&self, id: CustomerId) -> Result<Customer, PortError> {
        self.customers
            .iter()
            .find(|c| c.id() == id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Customer", id))
    }

    fn upsert_invoice(&mut self, invoice: &Invoice) {
        match self.invoices.iter_mut().find(|i| i.id() == invoice.id()) {
            Some(existing) => *existing = invoice.clone(),
            None => self.invoices.push(invoice.clone()),
        }
    }

    fn invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
        self.invoices
            .iter()
            .find(|i| i.id() == id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Invoice", id))
    }

    fn invoices_of(&self, customer_id: CustomerId) -> Vec<Invoice> {
        self.invoices
            .iter()
            .filter(|i| i.customer_id() == customer_id)
            .cloned()
            .collect()
    }

    fn open_invoices_of(&self, customer_id: CustomerId) -> Vec<Invoice> {
        let mut open: Vec<Invoice> = self
            .invoices_of(customer_id)
            .into_iter()
            .filter(|i| i.status().is_open())
            .collect();
        // stable: equal due dates keep creation order
        open.sort_by_key(|i| i.due_date());
        open
    }

    fn upsert_payment(&mut self, payment: &Payment) {
        match self.payments.iter_mut().find(|p| p.id() == payment.id()) {
            Some(existing) => *existing = payment.clone(),
            None => self.payments.push(payment.clone()),
        }
    }

    fn payment(&self, id: PaymentId) -> Result<Payment, PortError> {
        self.payments
            .iter()
            .find(|p| p.id() == id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Payment", id))
    }

    fn append_allocation(&mut self, allocation: &Allocation) -> Result<(), PortError> {
        if self.allocations.iter().any(|a| a.id() == allocation.id()) {
            return Err(PortError::conflict(format!(
                "allocation {} already recorded",
                allocation.id()
            )));
        }
        self.allocations.push(allocation.clone());
        Ok(())
    }
}

/// Implements the four store traits for a type with an async `state()` accessor
macro_rules! impl_ledger_stores {
    ($ty:ty) => {
        #[async_trait]
        impl CustomerStore for $ty {
            async fn save_customer(&self, customer: &Customer) -> Result<(), PortError> {
                self.state().await.upsert_customer(customer);
                Ok(())
            }

            async fn find_customer(&self, id: CustomerId) -> Result<Customer, PortError> {
                self.state().await.customer(id)
            }

            async fn list_customers(&self) -> Result<Vec<Customer>, PortError> {
                Ok(self.state().await.customers.iter().rev().cloned().collect())
            }

            async fn count_customers(&self) -> Result<u64, PortError> {
                Ok(self.state().await.customers.len() as u64)
            }
        }

        #[async_trait]
        impl InvoiceStore for $ty {
            async fn save_invoice(&self, invoice: &Invoice) -> Result<(), PortError> {
                self.state().await.upsert_invoice(invoice);
                Ok(())
            }

            async fn find_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
                self.state().await.invoice(id)
            }

            async fn find_open_invoices_by_customer(
                &self,
                customer_id: CustomerId,
            ) -> Result<Vec<Invoice>, PortError> {
                Ok(self.state().await.open_invoices_of(customer_id))
            }

            async fn find_invoices_by_customer(
                &self,
                customer_id: CustomerId,
            ) -> Result<Vec<Invoice>, PortError> {
                Ok(self.state().await.invoices_of(customer_id))
            }

            async fn list_invoices(&self) -> Result<Vec<Invoice>, PortError> {
                Ok(self.state().await.invoices.iter().rev().cloned().collect())
            }

            async fn count_open_invoices(&self) -> Result<u64, PortError> {
                let state = self.state().await;
                Ok(state.invoices.iter().filter(|i| i.status().is_open()).count() as u64)
            }

            async fn sum_invoice_totals(&self) -> Result<Vec<Money>, PortError> {
                let state = self.state().await;
                let totals: Vec<Money> = state.invoices.iter().map(Invoice::total_amount).collect();
                totals_by_currency(&totals)
            }
        }

        #[async_trait]
        impl PaymentStore for $ty {
            async fn save_payment(&self, payment: &Payment) -> Result<(), PortError> {
                self.state().await.upsert_payment(payment);
                Ok(())
            }

            async fn find_payment(&self, id: PaymentId) -> Result<Payment, PortError> {
                self.state().await.payment(id)
            }

            async fn find_payments_by_customer(
                &self,
                customer_id: CustomerId,
            ) -> Result<Vec<Payment>, PortError> {
                let state = self.state().await;
                Ok(state
                    .payments
                    .iter()
                    .filter(|p| p.customer_id() == customer_id)
                    .cloned()
                    .collect())
            }

            async fn list_payments(&self) -> Result<Vec<Payment>, PortError> {
                Ok(self.state().await.payments.iter().rev().cloned().collect())
            }

            async fn sum_payment_amounts(&self) -> Result<Vec<Money>, PortError> {
                let state = self.state().await;
                let amounts: Vec<Money> = state.payments.iter().map(Payment::amount).collect();
                totals_by_currency(&amounts)
            }
        }

        #[async_trait]
        impl AllocationStore for $ty {
            async fn save_allocation(&self, allocation: &Allocation) -> Result<(), PortError> {
                self.state().await.append_allocation(allocation)
            }

            async fn find_allocations_by_payment(
                &self,
                payment_id: PaymentId,
            ) -> Result<Vec<Allocation>, PortError> {
                let state = self.state().await;
                Ok(state
                    .allocations
                    .iter()
                    .filter(|a| a.payment_id() == payment_id)
                    .cloned()
                    .collect())
            }

            async fn find_allocations_by_invoice(
                &self,
                invoice_id: InvoiceId,
            ) -> Result<Vec<Allocation>, PortError> {
                let state = self.state().await;
                Ok(state
                    .allocations
                    .iter()
                    .filter(|a| a.invoice_id() == invoice_id)
                    .cloned()
                    .collect())
            }
        }
    };
}

/// Ledger store backed by process memory
///
/// Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerStore {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().await
    }
}

impl DomainPort for InMemoryLedgerStore {}

#[async_trait]
impl HealthCheckable for InMemoryLedgerStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult {
            adapter_id: "memory-ledger-store".to_string(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: Some("In-memory store".to_string()),
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl UnitOfWork for InMemoryLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, PortError> {
        let committed = Arc::clone(&self.state).lock_owned().await;
        let working = committed.clone();
        debug!("Began in-memory ledger transaction");
        Ok(Box::new(InMemoryTransaction {
            committed,
            working: Mutex::new(working),
        }))
    }
}

impl_ledger_stores!(InMemoryLedgerStore);

/// Transaction over [`InMemoryLedgerStore`]
///
/// Holds the store-wide lock until it is committed, rolled back or dropped.
pub struct InMemoryTransaction {
    committed: OwnedMutexGuard<LedgerState>,
    working: Mutex<LedgerState>,
}

impl InMemoryTransaction {
    async fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.working.lock().await
    }
}

impl_ledger_stores!(InMemoryTransaction);

#[async_trait]
impl LedgerTransaction for InMemoryTransaction {
    async fn lock_customer(&self, customer_id: CustomerId) -> Result<(), PortError> {
        // The store-wide lock is already held; only existence needs checking.
        self.state().await.customer(customer_id).map(|_| ())
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        let InMemoryTransaction {
            mut committed,
            working,
        } = *self;
        *committed = working.into_inner();
        debug!("Committed in-memory ledger transaction");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), PortError> {
        debug!("Rolled back in-memory ledger transaction");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_kernel::Currency;

    fn customer() -> Customer {
        Customer::new(CustomerId::new(), "Acme", None, None, Utc::now()).unwrap()
    }

    fn invoice(customer_id: CustomerId, total: i64, due: (i32, u32, u32)) -> Invoice {
        Invoice::new(
            InvoiceId::new(),
            customer_id,
            Money::new(total, Currency::USD).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(due.0, due.1, due.2).unwrap(),
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_open_invoices_ordered_by_due_date() {
        let store = InMemoryLedgerStore::new();
        let c = customer();
        store.save_customer(&c).await.unwrap();

        let late = invoice(c.id(), 100, (2024, 3, 1));
        let early = invoice(c.id(), 200, (2024, 2, 1));
        store.save_invoice(&late).await.unwrap();
        store.save_invoice(&early).await.unwrap();

        let open = store.find_open_invoices_by_customer(c.id()).await.unwrap();
        let ids: Vec<_> = open.iter().map(Invoice::id).collect();
        assert_eq!(ids, vec![early.id(), late.id()]);

        let listed = store.list_invoices().await.unwrap();
        assert_eq!(listed[0].id(), early.id());
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let store = InMemoryLedgerStore::new();
        let c = customer();

        let tx = store.begin().await.unwrap();
        tx.save_customer(&c).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.find_customer(c.id()).await.unwrap(), c);
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let store = InMemoryLedgerStore::new();
        let c = customer();

        let tx = store.begin().await.unwrap();
        tx.save_customer(&c).await.unwrap();
        tx.rollback().await.unwrap();

        assert!(store.find_customer(c.id()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let store = InMemoryLedgerStore::new();
        let c = customer();

        {
            let tx = store.begin().await.unwrap();
            tx.save_customer(&c).await.unwrap();
        }

        assert_eq!(store.count_customers().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_lock_missing_customer_is_not_found() {
        let store = InMemoryLedgerStore::new();
        let tx = store.begin().await.unwrap();
        let err = tx.lock_customer(CustomerId::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_allocation_is_conflict() {
        let store = InMemoryLedgerStore::new();
        let allocation = Allocation::restore(
            core_kernel::AllocationId::new(),
            PaymentId::new(),
            InvoiceId::new(),
            Money::new(10, Currency::USD).unwrap(),
            Utc::now(),
        )
        .unwrap();

        store.save_allocation(&allocation).await.unwrap();
        let err = store.save_allocation(&allocation).await.unwrap_err();
        assert!(matches!(err, PortError::Conflict { .. }));
    }
}
