//! Client for the OpenAI audio transcription API (Whisper).
//!
//! One request per upload: the audio goes out as multipart form content
//! with fixed model/language parameters and `verbose_json` as the response
//! format so segment timing comes back. The call is synchronous from the
//! request's point of view, bounded only by the configured timeout, and is
//! never retried - the orchestrator decides how a failure is surfaced.

use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tracing::{debug, error, info};

use crate::config::ServerConfig;
use crate::core::remote::RemoteError;

use super::messages::{OpenAiErrorResponse, VerboseTranscriptionResponse, render_transcript};

pub struct TranscriptionClient {
    http: Client,
    base_url: String,
    model: String,
    language: String,
    timeout: Duration,
}

impl TranscriptionClient {
    pub fn new(config: &ServerConfig) -> Result<Self, reqwest::Error> {
        // Whisper can take minutes for long recordings, so the per-request
        // timeout is set on each call rather than on the pooled client.
        let http = Client::builder().pool_max_idle_per_host(4).build()?;

        Ok(Self {
            http,
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.transcription_model.clone(),
            language: config.transcription_language.clone(),
            timeout: Duration::from_secs(config.transcription_timeout_secs),
        })
    }

    /// Transcribe one audio file and return the reconstructed transcript.
    pub async fn transcribe(
        &self,
        audio: Bytes,
        filename: &str,
        content_type: &str,
        api_key: &str,
    ) -> Result<String, RemoteError> {
        let url = format!("{}/audio/transcriptions", self.base_url);

        info!(
            "Sending {} bytes of audio to the transcription service (model={})",
            audio.len(),
            self.model
        );

        let file_part = Part::stream(reqwest::Body::from(audio))
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| RemoteError::Transport(format!("invalid content type: {e}")))?;

        let form = Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("language", self.language.clone())
            .text("response_format", "verbose_json");

        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(RemoteError::from_reqwest)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(RemoteError::from_reqwest)?;

        if !status.is_success() {
            let detail = match serde_json::from_str::<OpenAiErrorResponse>(&body) {
                Ok(envelope) => envelope.error.message,
                Err(_) => body,
            };
            error!("Transcription service rejected the request ({status}): {detail}");
            return Err(RemoteError::Rejected {
                status: status.as_u16(),
                body: detail,
            });
        }

        let parsed: VerboseTranscriptionResponse = serde_json::from_str(&body)
            .map_err(|e| RemoteError::Transport(format!("unparseable transcription response: {e}")))?;

        let transcript = render_transcript(&parsed);
        debug!(
            "Transcription complete: {} segments, {} characters",
            parsed.segments.len(),
            transcript.len()
        );
        Ok(transcript)
    }
}
