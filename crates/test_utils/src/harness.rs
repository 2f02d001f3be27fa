//! In-memory ledger harness
//!
//! Wires an [`InMemoryLedgerStore`] and a [`FixedClock`] into every ledger
//! service, with helpers for seeding and reloading data.

use std::sync::Arc;

use chrono::NaiveDate;
use core_kernel::{CustomerId, FixedClock, InvoiceId, Money, PaymentId};
use domain_ledger::{
    AccountsService, AllocationEngine, AllocationStore, Allocation, Customer, CustomerStore,
    InMemoryLedgerStore, Invoice, InvoiceStore, LedgerError, LedgerStore, Payment,
    PaymentRegistration, PaymentStore, RegisterPayment, ReportingService,
};

use crate::builders::{CustomerBuilder, InvoiceBuilder};
use crate::fixtures::DateFixtures;

pub struct LedgerHarness {
    pub store: Arc<InMemoryLedgerStore>,
    pub clock: Arc<FixedClock>,
    pub engine: AllocationEngine,
    pub accounts: AccountsService,
    pub reporting: ReportingService,
}

impl Default for LedgerHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerHarness {
    pub fn new() -> Self {
        Self::with_clock(DateFixtures::clock())
    }

    pub fn with_clock(clock: FixedClock) -> Self {
        let store = Arc::new(InMemoryLedgerStore::new());
        let clock = Arc::new(clock);
        let dyn_store: Arc<dyn LedgerStore> = store.clone();

        Self {
            engine: AllocationEngine::new(dyn_store.clone(), clock.clone()),
            accounts: AccountsService::new(dyn_store.clone(), clock.clone()),
            reporting: ReportingService::new(dyn_store),
            store,
            clock,
        }
    }

    /// Store as the services see it
    pub fn ledger_store(&self) -> Arc<dyn LedgerStore> {
        self.store.clone()
    }

    /// Saves a generated customer
    pub async fn customer(&self) -> Customer {
        let customer = CustomerBuilder::new().build();
        self.store.save_customer(&customer).await.unwrap();
        customer
    }

    /// Saves an OPEN invoice issued on the fixture date
    pub async fn invoice(&self, customer_id: CustomerId, total: Money, due: NaiveDate) -> Invoice {
        let invoice = InvoiceBuilder::new(customer_id)
            .with_total(total)
            .issued_on(due.min(DateFixtures::today()))
            .due_on(due)
            .build();
        self.store.save_invoice(&invoice).await.unwrap();
        invoice
    }

    /// Saves an invoice as given
    pub async fn save_invoice(&self, invoice: &Invoice) {
        self.store.save_invoice(invoice).await.unwrap();
    }

    pub async fn pay(&self, customer_id: CustomerId, amount: Money) -> Result<PaymentRegistration, LedgerError> {
        self.engine
            .register_payment(RegisterPayment {
                customer_id,
                amount,
                date: None,
                notes: None,
            })
            .await
    }

    pub async fn reload_invoice(&self, id: InvoiceId) -> Invoice {
        self.store.find_invoice(id).await.unwrap()
    }

    pub async fn reload_payment(&self, id: PaymentId) -> Payment {
        self.store.find_payment(id).await.unwrap()
    }

    pub async fn allocations_of(&self, id: PaymentId) -> Vec<Allocation> {
        self.store.find_allocations_by_payment(id).await.unwrap()
    }
}
