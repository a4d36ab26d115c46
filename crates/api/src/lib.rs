//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST routes for users, groups, memberships, expenses, receipts and balances
//! - JSON error rendering for every failure

pub mod error;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use splitledger_core::storage::ReceiptStorage;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Receipt storage (optional; receipt routes answer 503 without it).
    pub storage: Option<Arc<ReceiptStorage>>,
}

impl AppState {
    /// Creates state from a connection and optional receipt storage.
    #[must_use]
    pub fn new(db: DatabaseConnection, storage: Option<ReceiptStorage>) -> Self {
        Self {
            db: Arc::new(db),
            storage: storage.map(Arc::new),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    routes::api_routes(&state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
