//! Invoice handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use core_kernel::{Clock, InvoiceId};
use domain_ledger::{CreateInvoice, InvoiceListing};

use crate::dto::invoices::{CreateInvoiceRequest, InvoiceResponse};
use crate::dto::payments::AllocationResponse;
use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::AppState;

/// Issues an invoice dated today
pub async fn create_invoice(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), ApiError> {
    let invoice = state
        .accounts
        .create_invoice(CreateInvoice {
            customer_id: request.customer_id,
            amount: request.amount.to_money()?,
            due_date: request.due_date,
        })
        .await?;

    let listing = InvoiceListing {
        overdue: invoice.is_overdue(state.clock.today()),
        invoice,
    };
    Ok((StatusCode::CREATED, Json(InvoiceResponse::from(&listing))))
}

/// Newest first, with overdue flags
pub async fn list_invoices(
    State(state): State<AppState>,
) -> Result<Json<Vec<InvoiceResponse>>, ApiError> {
    let listings = state.accounts.list_invoices().await?;
    Ok(Json(listings.iter().map(InvoiceResponse::from).collect()))
}

pub async fn invoice_allocations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AllocationResponse>>, ApiError> {
    let invoice_id: InvoiceId = id.parse()?;
    let allocations = state.accounts.invoice_allocations(invoice_id).await?;
    Ok(Json(allocations.iter().map(AllocationResponse::from).collect()))
}
