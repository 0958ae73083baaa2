//! Shared failure model for outbound OpenAI API calls.
//!
//! Both the transcription and correction clients surface their failures
//! through [`RemoteError`] so the orchestrator can classify them once:
//! a rejection carries the upstream status and body, a timeout is its own
//! variant, and everything else is a transport failure. Calls are single
//! attempt; retry policy is left to the caller.

use thiserror::Error;

/// Failure of a single outbound call to an upstream OpenAI endpoint.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The upstream service answered with a non-success status.
    #[error("upstream rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// The configured request timeout elapsed before a response arrived.
    #[error("upstream request timed out")]
    Timeout,

    /// The request never completed (DNS, connect, TLS, read failures).
    #[error("failed to reach upstream: {0}")]
    Transport(String),
}

impl RemoteError {
    /// Map a reqwest transport error into the matching variant.
    ///
    /// reqwest reports an elapsed per-request timeout as an error on the
    /// future itself, so this is the single place that distinction is made.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }

    /// Upstream status code, when the upstream actually answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
