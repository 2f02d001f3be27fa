//! Ledger use cases
//!
//! Services hold the store and clock behind `Arc`s and are cheap to share
//! across request handlers.

pub mod accounts;
pub mod allocation_engine;
pub mod reporting;

pub use accounts::{AccountsService, CreateCustomer, CreateInvoice, InvoiceListing};
pub use allocation_engine::{AllocatedAmount, AllocationEngine, PaymentRegistration, RegisterPayment};
pub use reporting::ReportingService;
