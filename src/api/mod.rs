//! HTTP API module
//!
//! This module contains the endpoints the presentation layer uses to send
//! button input and read the nap status.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/button/:name", post(button_handler))
        .route("/increment", post(increment_handler))
        .route("/decrement", post(decrement_handler))
        .route("/toggle", post(toggle_handler))
        .route("/dismiss", post(dismiss_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
