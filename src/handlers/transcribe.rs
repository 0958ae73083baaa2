//! The transcription endpoint: one multipart upload in, corrected text out.
//!
//! Pipeline per request: validate the form, save the audio under a fresh
//! uuid, transcribe it, run the transcript through the correction model,
//! persist the result, and remove the temporary upload. Cleanup happens on
//! every exit path, success or failure, so the upload folder never
//! accumulates files.

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::{Multipart, State};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::dictionary::Dictionary;
use crate::core::{storage, upload};
use crate::errors::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub success: bool,
    /// Corrected transcript text.
    pub text: String,
    /// Basename of the persisted result file (`{uuid}_result.txt`).
    pub filename: String,
    /// Wall-clock seconds spent on the request, rounded to two decimals.
    pub processing_time: f64,
}

/// One uploaded audio file as extracted from the multipart form.
struct UploadedFile {
    filename: String,
    content_type: String,
    data: Bytes,
}

pub async fn transcribe(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ApiResult<Json<TranscribeResponse>> {
    let started = Instant::now();

    let (file, api_key) = extract_form(multipart, &state).await?;
    let id = Uuid::new_v4();

    info!(
        "Transcription request {}: {} ({}, {} bytes)",
        id,
        file.filename,
        file.content_type,
        file.data.len()
    );

    let saved_path = storage::save_upload(
        &state.config.upload_dir,
        &id,
        &file.filename,
        &file.data,
    )
    .await
    .map_err(ApiError::Save)?;

    // The upload must be removed whichever way the pipeline ends.
    let outcome = run_pipeline(&state, &id, &file, &api_key).await;
    storage::remove_upload(&saved_path).await;
    let (text, result_path) = outcome?;

    let filename = result_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{id}_result.txt"));

    let processing_time = (started.elapsed().as_secs_f64() * 100.0).round() / 100.0;
    info!("Request {} completed in {:.2}s", id, processing_time);

    Ok(Json(TranscribeResponse {
        success: true,
        text,
        filename,
        processing_time,
    }))
}

/// Pull the expected fields out of the form and validate them.
///
/// Field order in the form does not matter. Unknown fields are ignored; a
/// later duplicate of a known field wins, matching common form semantics.
async fn extract_form(
    mut multipart: Multipart,
    state: &AppState,
) -> ApiResult<(UploadedFile, String)> {
    let mut file: Option<UploadedFile> = None;
    let mut api_key: Option<String> = None;
    let mut file_type: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().unwrap_or("").to_string();
                let data = field.bytes().await?;
                file = Some(UploadedFile {
                    filename,
                    content_type,
                    data,
                });
            }
            Some("openai_api_key") => {
                api_key = Some(field.text().await?);
            }
            Some("file_type") => {
                file_type = Some(field.text().await?);
            }
            _ => {}
        }
    }

    let api_key = api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or(ApiError::MissingCredential)?;

    let file = file.ok_or(ApiError::MissingFile)?;
    if file.filename.is_empty() {
        return Err(ApiError::MissingFile);
    }

    // Client-asserted hint only. Validation and the forwarded content type
    // use what the multipart part itself declared.
    if let Some(hint) = file_type.filter(|t| !t.trim().is_empty()) {
        debug!("Client file_type hint: {hint}");
    }

    if !upload::is_allowed_upload(&file.filename, &file.content_type) {
        return Err(ApiError::UnsupportedFormat {
            extension: upload::file_extension(&file.filename).unwrap_or_else(|| "なし".to_string()),
            content_type: file.content_type.clone(),
        });
    }

    if file.data.is_empty() {
        return Err(ApiError::EmptyUpload);
    }

    if file.data.len() > state.config.max_upload_bytes {
        return Err(ApiError::MalformedRequest(format!(
            "upload of {} bytes exceeds the configured limit",
            file.data.len()
        )));
    }

    Ok((file, api_key))
}

/// Transcribe, correct, and persist. Returns the corrected text and the
/// path of the persisted result.
async fn run_pipeline(
    state: &AppState,
    id: &Uuid,
    file: &UploadedFile,
    api_key: &str,
) -> ApiResult<(String, std::path::PathBuf)> {
    let transcript = state
        .transcription
        .transcribe(
            file.data.clone(),
            &file.filename,
            upload::effective_mime(&file.content_type),
            api_key,
        )
        .await
        .map_err(ApiError::transcription)?;

    // Reloaded per request so dictionary edits take effect immediately.
    let dictionary = Dictionary::load(&state.config.dictionary_path);

    let corrected = state
        .correction
        .correct(&transcript, api_key, &dictionary)
        .await
        .map_err(ApiError::correction)?;

    let result_path = storage::persist_result(&state.config.result_dir, id, &corrected)
        .await
        .map_err(ApiError::Save)?;

    Ok((corrected, result_path))
}
