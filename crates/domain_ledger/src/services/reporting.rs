//! Statement and dashboard read models

use std::sync::Arc;

use tracing::instrument;

use core_kernel::CustomerId;

use crate::error::LedgerError;
use crate::ports::{CustomerStore, InvoiceStore, LedgerStore, PaymentStore};
use crate::projections::{DashboardStats, Statement};
use crate::services::accounts::customer_error;

pub struct ReportingService {
    store: Arc<dyn LedgerStore>,
}

impl ReportingService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Builds a customer's statement with running balances
    ///
    /// # Errors
    ///
    /// Returns `CustomerNotFound` if the customer does not exist.
    #[instrument(skip(self))]
    pub async fn customer_statement(&self, customer_id: CustomerId) -> Result<Statement, LedgerError> {
        let customer = self
            .store
            .find_customer(customer_id)
            .await
            .map_err(|e| customer_error(e, customer_id))?;
        let invoices = self.store.find_invoices_by_customer(customer_id).await?;
        let payments = self.store.find_payments_by_customer(customer_id).await?;

        Ok(Statement::build(customer, &invoices, &payments)?)
    }

    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<DashboardStats, LedgerError> {
        let revenue = self.store.sum_invoice_totals().await?;
        let collected = self.store.sum_payment_amounts().await?;
        let open_invoices = self.store.count_open_invoices().await?;
        let customers = self.store.count_customers().await?;

        Ok(DashboardStats::new(revenue, collected, open_invoices, customers))
    }
}
