//! Payment registration with FIFO waterfall allocation
//!
//! A new payment is spread over the customer's open invoices, oldest due date
//! first, until either the payment or the invoices run out. The payment, every
//! invoice update and every allocation record are written in one transaction.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use core_kernel::{AllocationId, Clock, CustomerId, InvoiceId, Money, PaymentId};

use crate::allocation::Allocation;
use crate::error::LedgerError;
use crate::payment::Payment;
use crate::ports::{
    run_in_transaction, AllocationStore, InvoiceStore, LedgerStore, LedgerTransaction, PaymentStore,
};

/// Input for [`AllocationEngine::register_payment`]
#[derive(Debug, Clone)]
pub struct RegisterPayment {
    pub customer_id: CustomerId,
    pub amount: Money,
    /// Defaults to the clock's current date
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Funds moved into one invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatedAmount {
    pub invoice_id: InvoiceId,
    pub amount: Money,
}

/// Result of a committed registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRegistration {
    pub payment_id: PaymentId,
    pub total_allocated: Money,
    /// Balance left on the payment after allocation
    pub remaining: Money,
    /// In the order the invoices were paid
    pub allocations: Vec<AllocatedAmount>,
}

/// Registers payments and allocates them to open invoices
pub struct AllocationEngine {
    store: Arc<dyn LedgerStore>,
    clock: Arc<dyn Clock>,
}

impl AllocationEngine {
    pub fn new(store: Arc<dyn LedgerStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Records a payment and allocates it FIFO by invoice due date
    ///
    /// Invoices in another currency are skipped. Whatever cannot be allocated
    /// stays on the payment as its available balance.
    ///
    /// # Errors
    ///
    /// - `Validation` if the amount is zero, before any store access
    /// - `CustomerNotFound` if the customer does not exist
    /// - any entity or storage error, in which case nothing is written
    #[instrument(
        skip(self, command),
        fields(customer_id = %command.customer_id, amount = %command.amount)
    )]
    pub async fn register_payment(&self, command: RegisterPayment) -> Result<PaymentRegistration, LedgerError> {
        if !command.amount.is_positive() {
            return Err(LedgerError::validation("payment amount must be greater than zero"));
        }

        let now = self.clock.now();
        let date = command.date.unwrap_or_else(|| self.clock.today());
        let payment = Payment::new(
            PaymentId::new(),
            command.customer_id,
            command.amount,
            date,
            command.notes,
            now,
        )?;

        let registration = run_in_transaction(self.store.as_ref(), move |tx| {
            Box::pin(allocate_fifo(tx, payment, now))
        })
        .await?;

        info!(
            payment_id = %registration.payment_id,
            allocated = %registration.total_allocated,
            remaining = %registration.remaining,
            invoices = registration.allocations.len(),
            "Payment registered"
        );

        Ok(registration)
    }
}

/// The waterfall itself, run inside an open transaction
async fn allocate_fifo(
    tx: &dyn LedgerTransaction,
    mut payment: Payment,
    now: DateTime<Utc>,
) -> Result<PaymentRegistration, LedgerError> {
    let customer_id = payment.customer_id();

    tx.lock_customer(customer_id).await.map_err(|e| {
        if e.is_not_found() {
            LedgerError::CustomerNotFound(customer_id)
        } else {
            e.into()
        }
    })?;

    tx.save_payment(&payment).await?;

    let invoices = tx.find_open_invoices_by_customer(customer_id).await?;
    debug!(open_invoices = invoices.len(), "Loaded open invoices");

    let mut total_allocated = Money::zero(payment.amount().currency());
    let mut allocations = Vec::new();

    for invoice in invoices {
        let available = payment.available_amount();
        if available.is_zero() {
            break;
        }
        if !invoice.total_amount().same_currency(&available) {
            debug!(invoice_id = %invoice.id(), "Skipping invoice in another currency");
            continue;
        }

        let amount = invoice.remaining_amount().min(&available)?;
        if amount.is_zero() {
            continue;
        }

        let outcome = Allocation::apply(AllocationId::new(), &payment, &invoice, amount, now)?;

        tx.save_invoice(&outcome.invoice).await?;
        tx.save_payment(&outcome.payment).await?;
        tx.save_allocation(&outcome.allocation).await?;

        debug!(
            invoice_id = %invoice.id(),
            amount = %amount,
            status = %outcome.invoice.status(),
            "Allocated funds"
        );

        total_allocated = total_allocated.checked_add(&amount)?;
        allocations.push(AllocatedAmount {
            invoice_id: invoice.id(),
            amount,
        });
        payment = outcome.payment;
    }

    Ok(PaymentRegistration {
        payment_id: payment.id(),
        total_allocated,
        remaining: payment.available_amount(),
        allocations,
    })
}
