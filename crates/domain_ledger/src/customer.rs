//! Customer entity
//!
//! A customer only anchors identity. Its balance is always derived from the
//! invoices and payments that reference it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::CustomerId;

use crate::error::LedgerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    id: CustomerId,
    name: String,
    email: Option<String>,
    tax_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Customer {
    /// Creates a new customer
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if the name is blank.
    pub fn new(
        id: CustomerId,
        name: impl Into<String>,
        email: Option<String>,
        tax_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(LedgerError::validation("customer name is required"));
        }

        Ok(Self {
            id,
            name,
            email: non_blank(email),
            tax_id: non_blank(tax_id),
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds a customer from stored fields
    pub fn restore(
        id: CustomerId,
        name: String,
        email: Option<String>,
        tax_id: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            tax_id,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> CustomerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn tax_id(&self) -> Option<&str> {
        self.tax_id.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
