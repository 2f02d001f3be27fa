//! Customer DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::CustomerId;
use domain_ledger::{CreateCustomer, Customer};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 64))]
    pub tax_id: Option<String>,
}

impl From<CreateCustomerRequest> for CreateCustomer {
    fn from(request: CreateCustomerRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            tax_id: request.tax_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerResponse {
    pub id: CustomerId,
    pub reference: String,
    pub name: String,
    pub email: Option<String>,
    pub tax_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Customer> for CustomerResponse {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id(),
            reference: customer.id().to_string(),
            name: customer.name().to_string(),
            email: customer.email().map(str::to_string),
            tax_id: customer.tax_id().map(str::to_string),
            created_at: customer.created_at(),
            updated_at: customer.updated_at(),
        }
    }
}
