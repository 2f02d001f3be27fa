//! Customer Ledger Domain
//!
//! Accounts-receivable core: customers owe invoices, pay with payments, and
//! payments are allocated to invoices by a FIFO waterfall.
//!
//! # Allocation
//!
//! Funds move only through [`Allocation::apply`], which debits a payment and
//! credits an invoice by the same amount and produces the allocation record.
//! [`AllocationEngine`] walks a customer's open invoices by due date and
//! writes the payment, every touched invoice and every allocation in one
//! transaction.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_ledger::{AllocationEngine, RegisterPayment};
//!
//! let engine = AllocationEngine::new(store, clock);
//! let registration = engine
//!     .register_payment(RegisterPayment {
//!         customer_id,
//!         amount: Money::new(70_000, Currency::USD)?,
//!         date: None,
//!         notes: None,
//!     })
//!     .await?;
//! assert_eq!(registration.allocations.len(), 2);
//! ```

pub mod customer;
pub mod invoice;
pub mod payment;
pub mod allocation;
pub mod projections;
pub mod ports;
pub mod adapters;
pub mod services;
pub mod error;

pub use customer::Customer;
pub use invoice::{Invoice, InvoiceStatus};
pub use payment::Payment;
pub use allocation::{Allocation, AllocationOutcome};
pub use projections::{CurrencyBalance, DashboardStats, Statement, StatementEntryKind, StatementLine};
pub use ports::{
    run_in_transaction, AllocationStore, CustomerStore, InvoiceStore, LedgerStore,
    LedgerTransaction, PaymentStore, TxFuture, UnitOfWork,
};
pub use adapters::InMemoryLedgerStore;
pub use services::{
    AccountsService, AllocatedAmount, AllocationEngine, CreateCustomer, CreateInvoice,
    InvoiceListing, PaymentRegistration, RegisterPayment, ReportingService,
};
pub use error::LedgerError;
