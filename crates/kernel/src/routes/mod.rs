//! HTTP route handlers.

pub mod catalog;
pub mod health;
pub mod metrics;

use axum::Router;

use crate::state::AppState;

/// All application routes, without middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(catalog::router())
        .merge(health::router())
        .merge(metrics::router())
}
