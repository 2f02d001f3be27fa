//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! customer ledger test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for common values
//! - `builders`: Builder patterns for ledger entities
//! - `harness`: Seeded in-memory ledger with its services wired up
//! - `assertions`: Custom assertion helpers for ledger invariants
//! - `generators`: Property-based test data generators
//! - `database`: Migrated PostgreSQL database for adapter tests

pub mod fixtures;
pub mod builders;
pub mod harness;
pub mod assertions;
pub mod generators;
pub mod database;

pub use fixtures::*;
pub use builders::*;
pub use harness::*;
pub use assertions::*;
pub use generators::*;
pub use database::{TestDatabase, TestDatabaseConfig, TEST_DATABASE_URL_ENV};
