//! Request and response bodies
//!
//! Amounts travel as integer minor units. Responses also carry the exact
//! major-unit value as a decimal string for display.

pub mod customers;
pub mod invoices;
pub mod money;
pub mod payments;
pub mod reports;

pub use money::{MoneyRequest, MoneyResponse};
