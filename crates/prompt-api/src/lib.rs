//! HTTP surface for the prompt-improvement service (spec.md §6): four
//! routes behind a request-ID middleware, backed by the domain layer
//! in `prompt-core` and the infrastructure layer in `prompt-infra`.

pub mod error_response;
pub mod handlers;
pub mod middleware;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Wraps a `DomainError` so handlers can return it directly with `?`
/// and have [`error_response::render`] shape the HTTP response.
pub struct ApiError(pub prompt_types::DomainError);

impl From<prompt_types::DomainError> for ApiError {
    fn from(error: prompt_types::DomainError) -> Self {
        ApiError(error)
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/improve-prompt", post(handlers::improve_prompt))
        .route("/health", get(handlers::health))
        .route("/api/v1/metrics/summary", get(handlers::metrics_summary))
        .route("/api/v1/metrics/trends", get(handlers::metrics_trends))
        .layer(axum::middleware::from_fn(middleware::request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
