//! Client for the OpenAI chat completion API.
//!
//! Takes the raw transcript, wraps it in the fixed correction prompt
//! (optionally enriched with dictionary examples) and returns the model's
//! answer verbatim. Single attempt, fixed sampling parameters, bounded by
//! the configured timeout.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, error, info};

use crate::config::ServerConfig;
use crate::core::dictionary::Dictionary;
use crate::core::remote::RemoteError;
use crate::core::transcription::messages::OpenAiErrorResponse;

use super::messages::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use super::prompt::build_system_prompt;

pub struct CorrectionClient {
    http: Client,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl CorrectionClient {
    pub fn new(config: &ServerConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().pool_max_idle_per_host(4).build()?;

        Ok(Self {
            http,
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.correction_model.clone(),
            temperature: config.correction_temperature,
            max_tokens: config.correction_max_tokens,
            timeout: Duration::from_secs(config.correction_timeout_secs),
        })
    }

    /// Clean up a raw transcript. The dictionary may be empty, in which
    /// case the prompt carries no dictionary section.
    pub async fn correct(
        &self,
        transcript: &str,
        api_key: &str,
        dictionary: &Dictionary,
    ) -> Result<String, RemoteError> {
        let url = format!("{}/chat/completions", self.base_url);

        info!(
            "Sending {} characters to the correction service (model={}, dictionary entries={})",
            transcript.len(),
            self.model,
            dictionary.len()
        );

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(build_system_prompt(dictionary)),
                ChatMessage::user(format!(
                    "以下の文字起こしデータを整形してください：\n\n{transcript}"
                )),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .bearer_auth(api_key)
            .json(&request)
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
            error!("Correction service rejected the request ({status}): {detail}");
            return Err(RemoteError::Rejected {
                status: status.as_u16(),
                body: detail,
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| RemoteError::Transport(format!("unparseable completion response: {e}")))?;

        let corrected = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                RemoteError::Transport("completion response contained no choices".to_string())
            })?;

        debug!("Correction complete: {} characters", corrected.len());
        Ok(corrected)
    }
}
