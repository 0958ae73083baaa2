//! Core processing components: remote service clients, the dictionary,
//! upload validation, and local storage.

pub mod correction;
pub mod dictionary;
pub mod remote;
pub mod storage;
pub mod transcription;
pub mod upload;

// Re-export commonly used types for convenience
pub use correction::CorrectionClient;
pub use dictionary::Dictionary;
pub use remote::RemoteError;
pub use transcription::TranscriptionClient;
