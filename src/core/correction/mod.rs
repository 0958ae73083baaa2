//! Transcript correction: the chat completion client and the prompt it sends.

mod client;
pub mod messages;
pub mod prompt;

pub use client::CorrectionClient;
pub use prompt::{MAX_DICTIONARY_EXAMPLES, SYSTEM_PROMPT, build_system_prompt};
