use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use linkhash_store::LinkStore;
use linkhash_types::ShortKey;

use crate::handler;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LinkStore>,
    base_url: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<dyn LinkStore>, base_url: &str) -> Self {
        Self {
            store,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        }
    }

    /// Format the public short link for `key`.
    pub fn short_link(&self, key: &ShortKey) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

/// Build the axum router with all linkhash endpoints.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", post(handler::create_handler))
        .route("/:key", get(handler::redirect_handler))
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
