//! Customer handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use core_kernel::CustomerId;

use crate::dto::customers::{CreateCustomerRequest, CustomerResponse};
use crate::dto::reports::StatementResponse;
use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::AppState;

pub async fn create_customer(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>), ApiError> {
    let customer = state.accounts.create_customer(request.into()).await?;
    Ok((StatusCode::CREATED, Json(CustomerResponse::from(&customer))))
}

/// Newest first
pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerResponse>>, ApiError> {
    let customers = state.accounts.list_customers().await?;
    Ok(Json(customers.iter().map(CustomerResponse::from).collect()))
}

pub async fn customer_statement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatementResponse>, ApiError> {
    let customer_id: CustomerId = id.parse()?;
    let statement = state.reporting.customer_statement(customer_id).await?;
    Ok(Json(StatementResponse::from(&statement)))
}
