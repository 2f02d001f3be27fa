//! Invoice DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{CustomerId, InvoiceId};
use domain_ledger::{InvoiceListing, InvoiceStatus};

use super::money::{MoneyRequest, MoneyResponse};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    pub customer_id: CustomerId,
    #[validate(nested)]
    pub amount: MoneyRequest,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceResponse {
    pub id: InvoiceId,
    pub reference: String,
    pub customer_id: CustomerId,
    pub total_amount: MoneyResponse,
    pub paid_amount: MoneyResponse,
    pub remaining_amount: MoneyResponse,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub overdue: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&InvoiceListing> for InvoiceResponse {
    fn from(listing: &InvoiceListing) -> Self {
        let invoice = &listing.invoice;
        Self {
            id: invoice.id(),
            reference: invoice.id().to_string(),
            customer_id: invoice.customer_id(),
            total_amount: invoice.total_amount().into(),
            paid_amount: invoice.paid_amount().into(),
            remaining_amount: invoice.remaining_amount().into(),
            issue_date: invoice.issue_date(),
            due_date: invoice.due_date(),
            status: invoice.status(),
            overdue: listing.overdue,
            created_at: invoice.created_at(),
            updated_at: invoice.updated_at(),
        }
    }
}
