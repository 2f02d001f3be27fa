//! Core error types used across the system

use thiserror::Error;
use crate::money::MoneyError;

/// Core error type for the kernel
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Invalid {kind} identifier: '{value}'")]
    InvalidIdentifier {
        kind: &'static str,
        value: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    pub fn invalid_identifier(kind: &'static str, value: impl Into<String>) -> Self {
        CoreError::InvalidIdentifier {
            kind,
            value: value.into(),
        }
    }
}
