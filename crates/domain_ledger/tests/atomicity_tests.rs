//! A failure part-way through allocation must leave no trace

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use core_kernel::{
    CustomerId, DomainPort, HealthCheckResult, HealthCheckable, InvoiceId, Money, PaymentId,
    PortError,
};
use domain_ledger::{
    Allocation, AllocationEngine, AllocationStore, Customer, CustomerStore, InMemoryLedgerStore,
    Invoice, InvoiceStatus, InvoiceStore, LedgerError, LedgerTransaction, Payment, PaymentStore,
    RegisterPayment, UnitOfWork,
};
use test_utils::{CustomerBuilder, DateFixtures, InvoiceBuilder, MoneyFixtures};

/// Store whose transactions refuse the allocation after `allowed` successful ones
struct FlakyStore {
    inner: InMemoryLedgerStore,
    allowed: usize,
}

struct FlakyTransaction {
    inner: Box<dyn LedgerTransaction>,
    remaining: AtomicUsize,
}

impl DomainPort for FlakyStore {}

#[async_trait]
impl HealthCheckable for FlakyStore {
    async fn health_check(&self) -> HealthCheckResult {
        self.inner.health_check().await
    }
}

#[async_trait]
impl UnitOfWork for FlakyStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, PortError> {
        Ok(Box::new(FlakyTransaction {
            inner: self.inner.begin().await?,
            remaining: AtomicUsize::new(self.allowed),
        }))
    }
}

macro_rules! delegate_stores {
    ($ty:ty, $field:ident) => {
        #[async_trait]
        impl CustomerStore for $ty {
            async fn save_customer(&self, customer: &Customer) -> Result<(), PortError> {
                self.$field.save_customer(customer).await
            }
            async fn find_customer(&self, id: CustomerId) -> Result<Customer, PortError> {
                self.$field.find_customer(id).await
            }
            async fn list_customers(&self) -> Result<Vec<Customer>, PortError> {
                self.$field.list_customers().await
            }
            async fn count_customers(&self) -> Result<u64, PortError> {
                self.$field.count_customers().await
            }
        }

        #[async_trait]
        impl InvoiceStore for $ty {
            async fn save_invoice(&self, invoice: &Invoice) -> Result<(), PortError> {
                self.$field.save_invoice(invoice).await
            }
            async fn find_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
                self.$field.find_invoice(id).await
            }
            async fn find_open_invoices_by_customer(&self, id: CustomerId) -> Result<Vec<Invoice>, PortError> {
                self.$field.find_open_invoices_by_customer(id).await
            }
            async fn find_invoices_by_customer(&self, id: CustomerId) -> Result<Vec<Invoice>, PortError> {
                self.$field.find_invoices_by_customer(id).await
            }
            async fn list_invoices(&self) -> Result<Vec<Invoice>, PortError> {
                self.$field.list_invoices().await
            }
            async fn count_open_invoices(&self) -> Result<u64, PortError> {
                self.$field.count_open_invoices().await
            }
            async fn sum_invoice_totals(&self) -> Result<Vec<Money>, PortError> {
                self.$field.sum_invoice_totals().await
            }
        }

        #[async_trait]
        impl PaymentStore for $ty {
            async fn save_payment(&self, payment: &Payment) -> Result<(), PortError> {
                self.$field.save_payment(payment).await
            }
            async fn find_payment(&self, id: PaymentId) -> Result<Payment, PortError> {
                self.$field.find_payment(id).await
            }
            async fn find_payments_by_customer(&self, id: CustomerId) -> Result<Vec<Payment>, PortError> {
                self.$field.find_payments_by_customer(id).await
            }
            async fn list_payments(&self) -> Result<Vec<Payment>, PortError> {
                self.$field.list_payments().await
            }
            async fn sum_payment_amounts(&self) -> Result<Vec<Money>, PortError> {
                self.$field.sum_payment_amounts().await
            }
        }
    };
}

delegate_stores!(FlakyStore, inner);
delegate_stores!(FlakyTransaction, inner);

#[async_trait]
impl AllocationStore for FlakyStore {
    async fn save_allocation(&self, allocation: &Allocation) -> Result<(), PortError> {
        self.inner.save_allocation(allocation).await
    }
    async fn find_allocations_by_payment(&self, id: PaymentId) -> Result<Vec<Allocation>, PortError> {
        self.inner.find_allocations_by_payment(id).await
    }
    async fn find_allocations_by_invoice(&self, id: InvoiceId) -> Result<Vec<Allocation>, PortError> {
        self.inner.find_allocations_by_invoice(id).await
    }
}

#[async_trait]
impl AllocationStore for FlakyTransaction {
    async fn save_allocation(&self, allocation: &Allocation) -> Result<(), PortError> {
        let left = self.remaining.load(Ordering::SeqCst);
        if left == 0 {
            return Err(PortError::connection("connection reset while saving allocation"));
        }
        self.remaining.store(left - 1, Ordering::SeqCst);
        self.inner.save_allocation(allocation).await
    }
    async fn find_allocations_by_payment(&self, id: PaymentId) -> Result<Vec<Allocation>, PortError> {
        self.inner.find_allocations_by_payment(id).await
    }
    async fn find_allocations_by_invoice(&self, id: InvoiceId) -> Result<Vec<Allocation>, PortError> {
        self.inner.find_allocations_by_invoice(id).await
    }
}

#[async_trait]
impl LedgerTransaction for FlakyTransaction {
    async fn lock_customer(&self, customer_id: CustomerId) -> Result<(), PortError> {
        self.inner.lock_customer(customer_id).await
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), PortError> {
        self.inner.rollback().await
    }
}

#[tokio::test]
async fn test_failed_second_allocation_rolls_everything_back() {
    let inner = InMemoryLedgerStore::new();
    let customer = CustomerBuilder::new().build();
    inner.save_customer(&customer).await.unwrap();

    let first = InvoiceBuilder::new(customer.id())
        .with_total(MoneyFixtures::usd(500))
        .due_on(DateFixtures::june(1))
        .build();
    let second = InvoiceBuilder::new(customer.id())
        .with_total(MoneyFixtures::usd(300))
        .due_on(DateFixtures::june(2))
        .build();
    inner.save_invoice(&first).await.unwrap();
    inner.save_invoice(&second).await.unwrap();

    let store = Arc::new(FlakyStore {
        inner: inner.clone(),
        allowed: 1,
    });
    let engine = AllocationEngine::new(store, Arc::new(DateFixtures::clock()));

    let err = engine
        .register_payment(RegisterPayment {
            customer_id: customer.id(),
            amount: MoneyFixtures::usd(700),
            date: None,
            notes: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::Port(PortError::Connection { .. })));
    assert!(inner.list_payments().await.unwrap().is_empty());
    for id in [first.id(), second.id()] {
        let invoice = inner.find_invoice(id).await.unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::Open);
        assert!(invoice.paid_amount().is_zero());
        assert!(inner.find_allocations_by_invoice(id).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_store_usable_after_rollback() {
    let inner = InMemoryLedgerStore::new();
    let customer = CustomerBuilder::new().build();
    inner.save_customer(&customer).await.unwrap();
    let invoice = InvoiceBuilder::new(customer.id()).build();
    inner.save_invoice(&invoice).await.unwrap();

    let flaky = AllocationEngine::new(
        Arc::new(FlakyStore { inner: inner.clone(), allowed: 0 }),
        Arc::new(DateFixtures::clock()),
    );
    let request = RegisterPayment {
        customer_id: customer.id(),
        amount: MoneyFixtures::usd_100(),
        date: None,
        notes: None,
    };
    assert!(flaky.register_payment(request.clone()).await.is_err());

    let healthy = AllocationEngine::new(Arc::new(inner.clone()), Arc::new(DateFixtures::clock()));
    let reg = healthy.register_payment(request).await.unwrap();

    assert_eq!(reg.total_allocated, MoneyFixtures::usd_100());
    assert_eq!(inner.list_payments().await.unwrap().len(), 1);
}
