//! Ledger Store Adapters
//!
//! Adapters implementing the store ports from [`crate::ports`] that live in
//! the domain crate itself. The PostgreSQL adapter is in `infra_db`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_ledger::adapters::InMemoryLedgerStore;
//! use domain_ledger::LedgerStore;
//! use std::sync::Arc;
//!
//! let store: Arc<dyn LedgerStore> = Arc::new(InMemoryLedgerStore::new());
//! ```

pub mod memory;

pub use memory::{InMemoryLedgerStore, InMemoryTransaction};
