//! SQL access for the ledger tables
//!
//! Queries are checked at runtime with `sqlx::query_as` and `FromRow` rows,
//! so the crate builds without a live database.

pub mod ledger;

pub use ledger::LedgerRepository;
