use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use linkhash_types::ShortKey;

use crate::error::{ServerError, ServerResult};
use crate::message::{CreateLinkRequest, CreateLinkResponse, HealthResponse};
use crate::router::AppState;

/// Store a link and return its short link.
pub async fn create_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateLinkRequest>,
) -> ServerResult<(StatusCode, Json<CreateLinkResponse>)> {
    if request.link.is_empty() {
        return Err(ServerError::InvalidRequest("link must not be empty".into()));
    }
    // The link is echoed back in a Location header on redirect.
    if HeaderValue::from_str(&request.link).is_err() {
        return Err(ServerError::InvalidRequest(
            "link contains characters not allowed in a URL".into(),
        ));
    }

    let key = state.store.put(&request.link);
    let response = CreateLinkResponse {
        link: state.short_link(&key),
        key,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Redirect a short key to its original link.
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ServerResult<Response> {
    let key = ShortKey::parse(&key).map_err(|_| ServerError::NotFound(key))?;
    let link = state
        .store
        .resolve(key.as_str())
        .ok_or_else(|| ServerError::NotFound(key.to_string()))?;
    let location =
        HeaderValue::from_str(&link).map_err(|e| ServerError::Internal(e.to_string()))?;
    Ok((StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response())
}

/// Health check handler.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(state.store.len(), state.store.collision_count()))
}

/// Info handler.
pub async fn info_handler() -> Json<serde_json::Value> {
    Json(json!({
        "name": "linkhash-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
