use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{api, transcribe};
use crate::state::AppState;
use std::sync::Arc;

/// Create the API router.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/transcribe", post(transcribe::transcribe))
        .route("/api/healthcheck", get(api::health_check))
        .layer(TraceLayer::new_for_http())
}
