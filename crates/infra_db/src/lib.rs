//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the customer ledger using SQLx:
//!
//! - [`pool`]: connection pool configuration and embedded migrations
//! - [`repositories`]: row types and SQL for the ledger tables
//! - [`adapters`]: the ledger store ports implemented over the repository
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresLedgerAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/ledger")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresLedgerAdapter::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::{PgLedgerTransaction, PostgresLedgerAdapter};
pub use error::DatabaseError;
pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
