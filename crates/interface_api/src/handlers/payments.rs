//! Payment handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use core_kernel::PaymentId;
use domain_ledger::RegisterPayment;

use crate::dto::payments::{
    AllocationResponse, PaymentRegistrationResponse, PaymentResponse, RegisterPaymentRequest,
};
use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::AppState;

/// Records a payment and allocates it across the customer's open invoices
pub async fn register_payment(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterPaymentRequest>,
) -> Result<(StatusCode, Json<PaymentRegistrationResponse>), ApiError> {
    let registration = state
        .engine
        .register_payment(RegisterPayment {
            customer_id: request.customer_id,
            amount: request.amount.to_money()?,
            date: request.date,
            notes: request.notes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(registration.into())))
}

pub async fn list_payments(
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let payments = state.accounts.list_payments().await?;
    Ok(Json(payments.iter().map(PaymentResponse::from).collect()))
}

pub async fn payment_allocations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AllocationResponse>>, ApiError> {
    let payment_id: PaymentId = id.parse()?;
    let allocations = state.accounts.payment_allocations(payment_id).await?;
    Ok(Json(allocations.iter().map(AllocationResponse::from).collect()))
}
