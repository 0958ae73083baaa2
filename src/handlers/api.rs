//! Health check endpoint.
//!
//! Reports whether the gateway can do its job right now: both storage
//! folders writable and enough free disk for an upload plus its result.
//! Probes that cannot produce an answer (metadata errors, transient
//! filesystem trouble) count as healthy so a flaky probe does not take the
//! service out of rotation.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::warn;

use crate::core::storage::{self, MIN_FREE_DISK_BYTES};
use crate::state::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    let mut errors: Vec<String> = Vec::new();

    if storage::directory_writable(&state.config.upload_dir) == Some(false) {
        errors.push(format!(
            "upload folder {} is not writable",
            state.config.upload_dir.display()
        ));
    }
    if storage::directory_writable(&state.config.result_dir) == Some(false) {
        errors.push(format!(
            "result folder {} is not writable",
            state.config.result_dir.display()
        ));
    }

    let free_bytes = storage::free_disk_space_bytes(&state.config.upload_dir);
    let disk_space_ok = match free_bytes {
        Some(bytes) if bytes < MIN_FREE_DISK_BYTES => {
            errors.push(format!(
                "free disk space below minimum ({} bytes available)",
                bytes
            ));
            false
        }
        Some(_) => true,
        // Unknown capacity is not a reason to fail the node.
        None => true,
    };

    let status = if errors.is_empty() {
        StatusCode::OK
    } else {
        warn!("Health check degraded: {}", errors.join("; "));
        StatusCode::SERVICE_UNAVAILABLE
    };

    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    let mut body = json!({
        "status": if errors.is_empty() { "ok" } else { "degraded" },
        "upload_folder": state.config.upload_dir.display().to_string(),
        "result_folder": state.config.result_dir.display().to_string(),
        "free_disk_space_gb": free_bytes
            .map(|bytes| (bytes as f64 / (1024.0 * 1024.0 * 1024.0) * 100.0).round() / 100.0),
        "disk_space_ok": disk_space_ok,
        "timestamp": timestamp,
    });

    if !errors.is_empty() {
        body["errors"] = json!(errors);
    }

    (status, Json(body)).into_response()
}
