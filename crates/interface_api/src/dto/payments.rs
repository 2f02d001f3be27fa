//! Payment and allocation DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{AllocationId, CustomerId, InvoiceId, PaymentId};
use domain_ledger::{AllocatedAmount, Allocation, Payment, PaymentRegistration};

use super::money::{MoneyRequest, MoneyResponse};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterPaymentRequest {
    pub customer_id: CustomerId,
    #[validate(nested)]
    pub amount: MoneyRequest,
    /// Defaults to today
    pub date: Option<NaiveDate>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocatedAmountResponse {
    pub invoice_id: InvoiceId,
    pub amount: MoneyResponse,
}

impl From<AllocatedAmount> for AllocatedAmountResponse {
    fn from(allocated: AllocatedAmount) -> Self {
        Self {
            invoice_id: allocated.invoice_id,
            amount: allocated.amount.into(),
        }
    }
}

/// Outcome of registering a payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRegistrationResponse {
    pub payment_id: PaymentId,
    pub total_allocated: MoneyResponse,
    pub remaining: MoneyResponse,
    pub allocations: Vec<AllocatedAmountResponse>,
}

impl From<PaymentRegistration> for PaymentRegistrationResponse {
    fn from(registration: PaymentRegistration) -> Self {
        Self {
            payment_id: registration.payment_id,
            total_allocated: registration.total_allocated.into(),
            remaining: registration.remaining.into(),
            allocations: registration
                .allocations
                .into_iter()
                .map(AllocatedAmountResponse::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub id: PaymentId,
    pub reference: String,
    pub customer_id: CustomerId,
    pub amount: MoneyResponse,
    pub available_amount: MoneyResponse,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id(),
            reference: payment.id().to_string(),
            customer_id: payment.customer_id(),
            amount: payment.amount().into(),
            available_amount: payment.available_amount().into(),
            date: payment.date(),
            notes: payment.notes().map(str::to_string),
            created_at: payment.created_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationResponse {
    pub id: AllocationId,
    pub payment_id: PaymentId,
    pub invoice_id: InvoiceId,
    pub amount: MoneyResponse,
    pub created_at: DateTime<Utc>,
}

impl From<&Allocation> for AllocationResponse {
    fn from(allocation: &Allocation) -> Self {
        Self {
            id: allocation.id(),
            payment_id: allocation.payment_id(),
            invoice_id: allocation.invoice_id(),
            amount: allocation.amount().into(),
            created_at: allocation.created_at(),
        }
    }
}
