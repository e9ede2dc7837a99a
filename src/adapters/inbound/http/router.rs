use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{handle_fetch_event, handle_storage_event, health};

use crate::ports::services::{FetchService, RelayService};

/// Application state containing the services behind the event endpoints
#[derive(Clone)]
pub struct AppState {
    pub relay_service: Arc<dyn RelayService>,
    /// Present only when the fetch surface is configured
    pub fetch_service: Option<Arc<dyn FetchService>>,
}

/// Create the main application router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Push endpoints for the event subscriptions
        .route("/v1/events/storage", post(handle_storage_event))
        .route("/v1/events/fetch", post(handle_fetch_event))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
