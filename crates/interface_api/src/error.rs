//! API error handling
//!
//! Every failure leaves the API as a JSON body `{ "error", "message" }` with a
//! matching status code. Ledger errors are mapped in one place below.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use core_kernel::{CoreError, MoneyError, PortError};
use domain_ledger::LedgerError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Well-formed request the ledger refuses in its current state
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String, Vec<String>),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Validation(msg, details) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                msg,
                (!details.is_empty()).then_some(details),
            ),
            ApiError::Unavailable(msg) => {
                error!(error = %msg, "Storage unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "service_unavailable",
                    "Storage is temporarily unavailable".to_string(),
                    None,
                )
            }
            ApiError::Internal(msg) => {
                error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::CustomerNotFound(_) => ApiError::NotFound(message),
            LedgerError::Validation(_) => ApiError::Validation(message, Vec::new()),
            LedgerError::InvoiceAlreadyPaid(_)
            | LedgerError::OverpaymentNotAllowed { .. }
            | LedgerError::InsufficientPaymentBalance { .. } => ApiError::Conflict(message),
            LedgerError::Money(e) => e.into(),
            LedgerError::Port(e) => e.into(),
            LedgerError::InvalidInvoiceState { .. } | LedgerError::PaymentAmountMismatch { .. } => {
                ApiError::Internal(message)
            }
        }
    }
}

impl From<MoneyError> for ApiError {
    fn from(err: MoneyError) -> Self {
        ApiError::Validation(err.to_string(), Vec::new())
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        let message = err.to_string();
        match err {
            PortError::NotFound { .. } => ApiError::NotFound(message),
            PortError::Validation { .. } => ApiError::BadRequest(message),
            PortError::Conflict { .. } => ApiError::Conflict(message),
            PortError::Connection { .. } => ApiError::Unavailable(message),
            PortError::Transformation { .. } | PortError::Internal { .. } => ApiError::Internal(message),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{field}: {msg}"),
                    None => format!("{field}: {}", e.code),
                })
            })
            .collect();
        details.sort();
        ApiError::Validation("Request validation failed".to_string(), details)
    }
}
