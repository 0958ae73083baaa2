//! Shared application state.

use crate::config::ServerConfig;
use crate::core::correction::CorrectionClient;
use crate::core::transcription::TranscriptionClient;

/// State handed to every handler.
///
/// The configuration is immutable after startup; the two HTTP clients hold
/// pooled connections and are shared across requests. Callers bring their
/// own OpenAI API key per request, so no credentials live here.
pub struct AppState {
    pub config: ServerConfig,
    pub transcription: TranscriptionClient,
    pub correction: CorrectionClient,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Self, reqwest::Error> {
        let transcription = TranscriptionClient::new(&config)?;
        let correction = CorrectionClient::new(&config)?;

        Ok(Self {
            config,
            transcription,
            correction,
        })
    }
}
