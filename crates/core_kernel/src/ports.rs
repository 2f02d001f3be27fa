//! Ports and Adapters Infrastructure
//!
//! Shared types for the hexagonal layout used by the ledger: domain crates
//! declare port traits that extend [`DomainPort`], and adapters (PostgreSQL,
//! in-memory) implement them.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │           Use cases (domain_ledger)          │
//! └──────────────────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────┐
//! │  Store ports + UnitOfWork (domain_ledger)    │
//! └──────────────────────────────────────────────┘
//!            ▲                        ▲
//!   ┌────────┴────────┐     ┌─────────┴────────┐
//!   │ Postgres adapter│     │ In-memory adapter│
//!   │   (infra_db)    │     │ (domain_ledger)  │
//!   └─────────────────┘     └──────────────────┘
//! ```

use std::fmt;
use thiserror::Error;
use serde::{Deserialize, Serialize};

/// Error type for port operations
///
/// Every adapter reports failures through this type so use cases handle
/// storage problems the same way regardless of the backend.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        /// Kind of record looked up, e.g. `Invoice`
        entity_type: String,
        /// Identifier as the caller supplied it
        id: String,
    },

    /// A validation error occurred
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        /// Offending field, when one can be named
        field: Option<String>,
    },

    /// The operation conflicts with existing data
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Stored data could not be mapped back into domain types
    #[error("Transformation error: {message}")]
    Transformation {
        message: String,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a `NotFound` error for `entity_type` with `id`
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a `Validation` error not tied to a field
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Creates a `Validation` error naming the offending field
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates a `Connection` error without an underlying source
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    pub fn transformation(message: impl Into<String>) -> Self {
        PortError::Transformation {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(self, PortError::Connection { .. })
    }

    /// Returns true if the entity does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
///
/// Ports are shared across request handlers, so they must be thread-safe.
pub trait DomainPort: Send + Sync + 'static {}

/// Health status for an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    /// Answering normally
    Healthy,
    /// Answering, but slowly or with partial failures
    Degraded,
    /// Not answering; requests will fail
    Unhealthy,
    /// Not checked yet
    Unknown,
}

/// Health check result for an adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Stable name of the adapter, e.g. `postgres-ledger-adapter`
    pub adapter_id: String,
    /// Outcome of the probe
    pub status: AdapterHealth,
    /// Round-trip time of the probe in milliseconds
    pub latency_ms: u64,
    /// Failure detail or a note about the backend
    pub message: Option<String>,
    /// When the probe ran
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

impl HealthCheckResult {
    /// True only for [`AdapterHealth::Healthy`]
    pub fn is_healthy(&self) -> bool {
        self.status == AdapterHealth::Healthy
    }
}

/// Trait for adapters that support health checks
#[async_trait::async_trait]
pub trait HealthCheckable: Send + Sync {
    /// Probes the backing system; never fails, reporting problems in the result
    async fn health_check(&self) -> HealthCheckResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_not_found() {
        let error = PortError::not_found("Invoice", "INV-123");
        assert!(error.is_not_found());
        assert!(!error.is_transient());
        assert!(error.to_string().contains("Invoice"));
        assert!(error.to_string().contains("INV-123"));
    }

    #[test]
    fn test_port_error_transient() {
        assert!(PortError::connection("pool closed").is_transient());
        assert!(!PortError::validation("bad email").is_transient());
        assert!(!PortError::conflict("duplicate id").is_transient());
    }

    #[test]
    fn test_health_check_result() {
        let result = HealthCheckResult {
            adapter_id: "memory".to_string(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: None,
            checked_at: chrono::Utc::now(),
        };
        assert!(result.is_healthy());
    }
}
