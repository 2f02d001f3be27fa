//! Ledger port adapters backed by PostgreSQL

pub mod ledger;

pub use ledger::{PgLedgerTransaction, PostgresLedgerAdapter};
