//! Database Test Utilities
//!
//! Provides a migrated PostgreSQL database for adapter tests. When
//! `LEDGER_TEST_DATABASE_URL` is set that database is used directly;
//! otherwise a throwaway container is started with testcontainers.

use std::time::Duration;

use infra_db::{run_migrations, PostgresLedgerAdapter};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};

const POSTGRES_IMAGE: &str = "postgres";
const POSTGRES_TAG: &str = "16-alpine";
const POSTGRES_USER: &str = "ledger";
const POSTGRES_PASSWORD: &str = "ledger";
const POSTGRES_DB: &str = "ledger_test";

/// Environment variable naming an existing database to test against
pub const TEST_DATABASE_URL_ENV: &str = "LEDGER_TEST_DATABASE_URL";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone)]
pub struct TestDatabaseConfig {
    pub user: String,
    pub password: String,
    pub database: String,
    pub host: String,
    pub port: u16,
}

impl Default for TestDatabaseConfig {
    fn default() -> Self {
        Self {
            user: POSTGRES_USER.to_string(),
            password: POSTGRES_PASSWORD.to_string(),
            database: POSTGRES_DB.to_string(),
            host: "localhost".to_string(),
            port: 5432,
        }
    }
}

impl TestDatabaseConfig {
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

/// A migrated, empty ledger database
pub struct TestDatabase {
    _container: Option<ContainerAsync<GenericImage>>,
    pool: PgPool,
}

impl TestDatabase {
    /// Connects to `LEDGER_TEST_DATABASE_URL` or starts a container, then migrates
    pub async fn new() -> Result<Self, BoxError> {
        let (container, url) = match std::env::var(TEST_DATABASE_URL_ENV) {
            Ok(url) => (None, url),
            Err(_) => {
                let (container, config) = start_container().await?;
                (Some(container), config.connection_url())
            }
        };

        let pool = connect_with_retry(&url).await?;
        run_migrations(&pool).await?;

        let db = Self {
            _container: container,
            pool,
        };
        db.clear_data().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Ledger adapter over this database
    pub fn store(&self) -> PostgresLedgerAdapter {
        PostgresLedgerAdapter::new(self.pool.clone())
    }

    /// Empties every ledger table, keeping the schema
    pub async fn clear_data(&self) -> Result<(), BoxError> {
        sqlx::query("TRUNCATE TABLE allocations, payments, invoices, customers CASCADE")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

async fn start_container() -> Result<(ContainerAsync<GenericImage>, TestDatabaseConfig), BoxError> {
    let container = GenericImage::new(POSTGRES_IMAGE, POSTGRES_TAG)
        .with_exposed_port(5432.tcp())
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_USER", POSTGRES_USER)
        .with_env_var("POSTGRES_PASSWORD", POSTGRES_PASSWORD)
        .with_env_var("POSTGRES_DB", POSTGRES_DB)
        .start()
        .await?;

    let config = TestDatabaseConfig {
        host: container.get_host().await?.to_string(),
        port: container.get_host_port_ipv4(5432).await?,
        ..TestDatabaseConfig::default()
    };
    Ok((container, config))
}

// postgres restarts once after initdb, so the first ready message can be early
async fn connect_with_retry(url: &str) -> Result<PgPool, BoxError> {
    let mut attempts = 0;
    loop {
        let result = PgPoolOptions::new()
            .max_connections(8)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await;
        match result {
            Ok(pool) => return Ok(pool),
            Err(e) if attempts >= 10 => return Err(e.into()),
            Err(_) => {
                attempts += 1;
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_connection_url() {
        let url = TestDatabaseConfig::default().connection_url();

        assert!(url.starts_with("postgres://"));
        assert!(url.contains(POSTGRES_USER));
        assert!(url.ends_with(POSTGRES_DB));
    }
}
