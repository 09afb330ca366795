//! REST backend for customers, customer accounts, products and orders on PostgreSQL.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{resolve, ResolvedModel, Settings};
pub use error::{AppError, ConfigError, FieldErrors};
pub use routes::{common_routes_with_ready, entity_routes};
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_tables};

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Full application router: common and entity routes behind tracing, CORS and a body size limit.
pub fn app(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .merge(common_routes_with_ready(state.clone()))
        .merge(entity_routes(state))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
