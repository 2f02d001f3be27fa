//! HTTP API Layer
//!
//! REST API for the customer ledger using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: one module per resource, thin wrappers over the ledger services
//! - **Middleware**: request logging
//! - **DTOs**: request/response shapes and their validation rules
//! - **Error Handling**: every failure becomes a JSON error body
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(store, Arc::new(SystemClock), config);
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::Clock;
use domain_ledger::{AccountsService, AllocationEngine, LedgerStore, ReportingService};

use crate::config::ApiConfig;
use crate::handlers::{customers, dashboard, health, invoices, payments};
use crate::middleware::request_logging_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LedgerStore>,
    pub clock: Arc<dyn Clock>,
    pub engine: Arc<AllocationEngine>,
    pub accounts: Arc<AccountsService>,
    pub reporting: Arc<ReportingService>,
    pub config: ApiConfig,
}

impl AppState {
    /// Wires the ledger services over one store and clock
    pub fn new(store: Arc<dyn LedgerStore>, clock: Arc<dyn Clock>, config: ApiConfig) -> Self {
        Self {
            engine: Arc::new(AllocationEngine::new(store.clone(), clock.clone())),
            accounts: Arc::new(AccountsService::new(store.clone(), clock.clone())),
            reporting: Arc::new(ReportingService::new(store.clone())),
            store,
            clock,
            config,
        }
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let customer_routes = Router::new()
        .route("/", post(customers::create_customer).get(customers::list_customers))
        .route("/:id/statement", get(customers::customer_statement));

    let invoice_routes = Router::new()
        .route("/", post(invoices::create_invoice).get(invoices::list_invoices))
        .route("/:id/allocations", get(invoices::invoice_allocations));

    let payment_routes = Router::new()
        .route("/", post(payments::register_payment).get(payments::list_payments))
        .route("/:id/allocations", get(payments::payment_allocations));

    let api_routes = Router::new()
        .nest("/customers", customer_routes)
        .nest("/invoices", invoice_routes)
        .nest("/payments", payment_routes)
        .route("/dashboard", get(dashboard::dashboard))
        .layer(axum_middleware::from_fn(request_logging_middleware));

    Router::new()
        .merge(health_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
