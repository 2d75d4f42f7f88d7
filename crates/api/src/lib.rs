//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - The contact-form route (`POST /send-email`)
//! - Liveness and health routes
//! - The JSON response shape shared by all outcomes

pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method},
};
use relay_core::submission::SubmissionService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Submission pipeline (staging, composition, dispatch).
    pub submissions: Arc<SubmissionService>,
    /// Maximum request body size for `POST /send-email`, in bytes.
    pub body_limit: usize,
}

/// Creates the main application router.
///
/// An empty `allowed_origins` list allows any origin.
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .merge(routes::api_routes(&state))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(origins)
}
