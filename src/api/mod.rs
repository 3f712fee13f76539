//! HTTP API module
//!
//! The main window and popup surfaces, exposed as HTTP endpoints.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Main window
        .route("/settings", get(settings_handler))
        .route("/start", post(start_handler))
        .route("/stop", post(stop_handler))
        .route("/config", put(update_config_handler))
        .route("/normalize", post(normalize_handler))
        // Popup window
        .route("/popup", get(popup_handler))
        .route("/popup/close", post(popup_close_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
