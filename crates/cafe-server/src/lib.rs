//! Cafe API server
//!
//! A small JSON HTTP service over a single SQLite-backed table of cafes:
//! random pick, full listing, location search, creation, price updates and
//! shared-secret guarded deletion.

pub mod error;
pub mod handlers;
pub mod models;
pub mod storage;

use std::path::Path;
use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;

use storage::Database;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub api_key: String,
}

/// Create the application router.
pub fn create_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route("/health", get(handlers::health))
        .route("/random", get(handlers::cafes::random))
        .route("/all", get(handlers::cafes::all))
        .route("/search", get(handlers::cafes::search))
        .route("/add", post(handlers::cafes::add))
        .route("/update-price/:id", get(handlers::cafes::update_price))
        .route("/report-closed/:id", delete(handlers::cafes::report_closed))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
