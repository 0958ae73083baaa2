//! HTTP request handlers
//!
//! - `api` - Health check endpoint
//! - `pages` - Upload form page and favicon
//! - `transcribe` - Audio upload, transcription, and correction pipeline

pub mod api;
pub mod pages;
pub mod transcribe;
