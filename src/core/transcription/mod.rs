//! Speech-to-text: the OpenAI transcription client and its wire types.

mod client;
pub mod messages;

pub use client::TranscriptionClient;
pub use messages::{TranscriptionSegment, VerboseTranscriptionResponse, render_transcript};
