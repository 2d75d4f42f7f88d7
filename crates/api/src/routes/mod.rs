//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod contact;
pub mod health;

/// Creates the API router with all routes.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(contact::routes(state.body_limit))
}
