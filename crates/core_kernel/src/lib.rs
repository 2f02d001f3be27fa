//! Core Kernel - Foundational types for the customer ledger
//!
//! This crate provides the building blocks shared by every other crate:
//! - Money with exact integer (minor unit) arithmetic
//! - Typed identifiers for ledger entities
//! - The clock abstraction
//! - Port error and health types for adapters

pub mod money;
pub mod identifiers;
pub mod clock;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError};
pub use identifiers::{CustomerId, InvoiceId, PaymentId, AllocationId};
pub use clock::{Clock, SystemClock, FixedClock};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
pub use error::CoreError;
