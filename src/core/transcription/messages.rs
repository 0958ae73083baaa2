//! Response types for the OpenAI audio transcription API.
//!
//! The gateway always requests `verbose_json` so the response carries
//! per-segment timing, which is folded into a line-oriented transcript with
//! `[MM:SS]` prefixes.
//!
//! API Reference: https://platform.openai.com/docs/api-reference/audio/createTranscription

use serde::Deserialize;

/// Verbose transcription response (`response_format=verbose_json`).
#[derive(Debug, Clone, Deserialize)]
pub struct VerboseTranscriptionResponse {
    /// The full transcript.
    pub text: String,

    /// Segments with timing information; absent for some models.
    #[serde(default)]
    pub segments: Vec<TranscriptionSegment>,
}

/// A span of audio with its transcribed text.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionSegment {
    /// Start offset in seconds (fractional). Missing for some providers.
    #[serde(default)]
    pub start: Option<f64>,

    /// Transcribed text for this span.
    #[serde(default)]
    pub text: String,
}

/// Error envelope returned by the OpenAI API.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiErrorResponse {
    pub error: OpenAiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiErrorDetail {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: String,
}

/// Fold a verbose response into the transcript handed to correction.
///
/// With segments present, each non-empty segment becomes one
/// `"[MM:SS] text"` line (minutes and seconds by integer floor of the
/// start offset); a segment without timing keeps its text unprefixed.
/// Without segments the flat transcript is returned as-is.
pub fn render_transcript(response: &VerboseTranscriptionResponse) -> String {
    if response.segments.is_empty() {
        return response.text.clone();
    }

    let mut lines = Vec::with_capacity(response.segments.len());
    for segment in &response.segments {
        let text = segment.text.trim();
        if text.is_empty() {
            continue;
        }

        match segment.start {
            Some(start) if start >= 0.0 => {
                let whole = start as u64;
                lines.push(format!("[{:02}:{:02}] {}", whole / 60, whole % 60, text));
            }
            _ => lines.push(text.to_string()),
        }
    }
    lines.join("\n")
}
