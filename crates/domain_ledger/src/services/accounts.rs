//! Customer and invoice management plus plain listings

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use core_kernel::{Clock, CustomerId, InvoiceId, Money, PaymentId, PortError};

use crate::allocation::Allocation;
use crate::customer::Customer;
use crate::error::LedgerError;
use crate::invoice::Invoice;
use crate::payment::Payment;
use crate::ports::{AllocationStore, CustomerStore, InvoiceStore, LedgerStore, PaymentStore};

#[derive(Debug, Clone)]
pub struct CreateCustomer {
    pub name: String,
    pub email: Option<String>,
    pub tax_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub customer_id: CustomerId,
    pub amount: Money,
    pub due_date: NaiveDate,
}

/// Invoice as shown in listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceListing {
    pub invoice: Invoice,
    /// Still owed and past its due date
    pub overdue: bool,
}

/// Creates customers and invoices, and serves the simple read models
pub struct AccountsService {
    store: Arc<dyn LedgerStore>,
    clock: Arc<dyn Clock>,
}

impl AccountsService {
    pub fn new(store: Arc<dyn LedgerStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_customer(&self, request: CreateCustomer) -> Result<Customer, LedgerError> {
        let customer = Customer::new(
            CustomerId::new(),
            request.name,
            request.email,
            request.tax_id,
            self.clock.now(),
        )?;

        self.store.save_customer(&customer).await?;
        info!(customer_id = %customer.id(), "Customer created");
        Ok(customer)
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>, LedgerError> {
        Ok(self.store.list_customers().await?)
    }

    /// Issues an OPEN invoice dated today
    ///
    /// # Errors
    ///
    /// - `Validation` if the amount is zero
    /// - `CustomerNotFound` if the customer does not exist
    #[instrument(skip(self, request), fields(customer_id = %request.customer_id, amount = %request.amount))]
    pub async fn create_invoice(&self, request: CreateInvoice) -> Result<Invoice, LedgerError> {
        let invoice = Invoice::new(
            InvoiceId::new(),
            request.customer_id,
            request.amount,
            self.clock.today(),
            request.due_date,
            self.clock.now(),
        )?;

        self.store
            .find_customer(request.customer_id)
            .await
            .map_err(|e| customer_error(e, request.customer_id))?;

        self.store.save_invoice(&invoice).await?;
        info!(invoice_id = %invoice.id(), "Invoice created");
        Ok(invoice)
    }

    /// All invoices, newest first, flagged when overdue
    pub async fn list_invoices(&self) -> Result<Vec<InvoiceListing>, LedgerError> {
        let today = self.clock.today();
        let invoices = self.store.list_invoices().await?;
        Ok(invoices
            .into_iter()
            .map(|invoice| InvoiceListing {
                overdue: invoice.is_overdue(today),
                invoice,
            })
            .collect())
    }

    pub async fn list_payments(&self) -> Result<Vec<Payment>, LedgerError> {
        Ok(self.store.list_payments().await?)
    }

    /// Allocations made from a payment
    ///
    /// # Errors
    ///
    /// Returns `Port(NotFound)` if the payment does not exist.
    pub async fn payment_allocations(&self, payment_id: PaymentId) -> Result<Vec<Allocation>, LedgerError> {
        self.store.find_payment(payment_id).await?;
        Ok(self.store.find_allocations_by_payment(payment_id).await?)
    }

    /// Allocations received by an invoice
    pub async fn invoice_allocations(&self, invoice_id: InvoiceId) -> Result<Vec<Allocation>, LedgerError> {
        self.store.find_invoice(invoice_id).await?;
        Ok(self.store.find_allocations_by_invoice(invoice_id).await?)
    }
}

/// Maps a customer lookup failure, keeping storage errors as they are
pub(crate) fn customer_error(error: PortError, customer_id: CustomerId) -> LedgerError {
    if error.is_not_found() {
        LedgerError::CustomerNotFound(customer_id)
    } else {
        error.into()
    }
}
