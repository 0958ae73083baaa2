//! Configuration module for the Scribe Gateway server
//!
//! Configuration comes from three sources with the priority
//! YAML > environment variables > built-in defaults. A `.env` file, when
//! present, is loaded into the environment before any of this runs.
//! The resulting [`ServerConfig`] is immutable: it is built once at startup
//! and handed to every component through the application state, never
//! through ambient globals.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

mod yaml;

pub use yaml::YamlConfig;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_UPLOAD_FOLDER: &str = "uploads";
const DEFAULT_RESULT_FOLDER: &str = "results";
const DEFAULT_DICTIONARY_PATH: &str = "dictionary.json";
const DEFAULT_MAX_UPLOAD_MB: u64 = 32;
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
const DEFAULT_TRANSCRIPTION_LANGUAGE: &str = "ja";
const DEFAULT_TRANSCRIPTION_TIMEOUT_SECS: u64 = 300;
const DEFAULT_CORRECTION_MODEL: &str = "gpt-4o";
const DEFAULT_CORRECTION_TEMPERATURE: f32 = 0.3;
const DEFAULT_CORRECTION_MAX_TOKENS: u32 = 4000;
const DEFAULT_CORRECTION_TIMEOUT_SECS: u64 = 180;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid environment variable {name}: {value}")]
    InvalidEnv { name: String, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration
///
/// Holds everything the gateway needs at runtime: listen address, storage
/// locations, upload limits, the OpenAI endpoint and per-stage model and
/// timeout parameters, and the CORS policy. API credentials are *not* part
/// of the configuration; callers supply their own key with each request.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // Storage locations
    pub upload_dir: PathBuf,
    pub result_dir: PathBuf,
    /// Optional domain term dictionary, reloaded per request.
    pub dictionary_path: PathBuf,
    /// Request body cap for the upload endpoint.
    pub max_upload_bytes: usize,

    // OpenAI endpoint (overridable for tests and compatible proxies)
    pub openai_base_url: String,

    // Transcription parameters
    pub transcription_model: String,
    pub transcription_language: String,
    /// Generous: long recordings can take minutes to transcribe.
    pub transcription_timeout_secs: u64,

    // Correction parameters
    pub correction_model: String,
    pub correction_temperature: f32,
    pub correction_max_tokens: u32,
    pub correction_timeout_secs: u64,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (CORS disabled, same-origin only)
    pub cors_allowed_origins: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_FOLDER),
            result_dir: PathBuf::from(DEFAULT_RESULT_FOLDER),
            dictionary_path: PathBuf::from(DEFAULT_DICTIONARY_PATH),
            max_upload_bytes: (DEFAULT_MAX_UPLOAD_MB * 1024 * 1024) as usize,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            transcription_model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
            transcription_language: DEFAULT_TRANSCRIPTION_LANGUAGE.to_string(),
            transcription_timeout_secs: DEFAULT_TRANSCRIPTION_TIMEOUT_SECS,
            correction_model: DEFAULT_CORRECTION_MODEL.to_string(),
            correction_temperature: DEFAULT_CORRECTION_TEMPERATURE,
            correction_max_tokens: DEFAULT_CORRECTION_MAX_TOKENS,
            correction_timeout_secs: DEFAULT_CORRECTION_TIMEOUT_SECS,
            cors_allowed_origins: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables over defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, with environment variables
    /// filling any gaps the file leaves open.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let yaml: YamlConfig =
            serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::default();
        config.apply_env()?;
        config.apply_yaml(yaml);
        config.validate()?;
        Ok(config)
    }

    /// Socket address string to bind.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Create the upload and result folders if they do not exist yet.
    pub fn ensure_storage_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.upload_dir)?;
        std::fs::create_dir_all(&self.result_dir)?;
        info!(
            "Storage ready: uploads at {}, results at {}",
            self.upload_dir.display(),
            self.result_dir.display()
        );
        Ok(())
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(host) = env_string("HOST") {
            self.host = host;
        }
        if let Some(port) = env_parsed("PORT")? {
            self.port = port;
        }
        if let Some(dir) = env_string("UPLOAD_FOLDER") {
            self.upload_dir = PathBuf::from(dir);
        }
        if let Some(dir) = env_string("RESULT_FOLDER") {
            self.result_dir = PathBuf::from(dir);
        }
        if let Some(path) = env_string("DICTIONARY_PATH") {
            self.dictionary_path = PathBuf::from(path);
        }
        if let Some(mb) = env_parsed::<u64>("MAX_UPLOAD_MB")? {
            self.max_upload_bytes = (mb * 1024 * 1024) as usize;
        }
        if let Some(url) = env_string("OPENAI_BASE_URL") {
            self.openai_base_url = url;
        }
        if let Some(model) = env_string("TRANSCRIPTION_MODEL") {
            self.transcription_model = model;
        }
        if let Some(language) = env_string("TRANSCRIPTION_LANGUAGE") {
            self.transcription_language = language;
        }
        if let Some(secs) = env_parsed("TRANSCRIPTION_TIMEOUT_SECS")? {
            self.transcription_timeout_secs = secs;
        }
        if let Some(model) = env_string("CORRECTION_MODEL") {
            self.correction_model = model;
        }
        if let Some(temperature) = env_parsed("CORRECTION_TEMPERATURE")? {
            self.correction_temperature = temperature;
        }
        if let Some(max_tokens) = env_parsed("CORRECTION_MAX_TOKENS")? {
            self.correction_max_tokens = max_tokens;
        }
        if let Some(secs) = env_parsed("CORRECTION_TIMEOUT_SECS")? {
            self.correction_timeout_secs = secs;
        }
        if let Some(origins) = env_string("CORS_ALLOWED_ORIGINS") {
            self.cors_allowed_origins = Some(origins);
        }
        Ok(())
    }

    fn apply_yaml(&mut self, yaml: YamlConfig) {
        if let Some(server) = yaml.server {
            if let Some(host) = server.host {
                self.host = host;
            }
            if let Some(port) = server.port {
                self.port = port;
            }
        }
        if let Some(storage) = yaml.storage {
            if let Some(dir) = storage.upload_folder {
                self.upload_dir = PathBuf::from(dir);
            }
            if let Some(dir) = storage.result_folder {
                self.result_dir = PathBuf::from(dir);
            }
            if let Some(path) = storage.dictionary_path {
                self.dictionary_path = PathBuf::from(path);
            }
            if let Some(mb) = storage.max_upload_mb {
                self.max_upload_bytes = (mb * 1024 * 1024) as usize;
            }
        }
        if let Some(openai) = yaml.openai {
            if let Some(url) = openai.base_url {
                self.openai_base_url = url;
            }
        }
        if let Some(transcription) = yaml.transcription {
            if let Some(model) = transcription.model {
                self.transcription_model = model;
            }
            if let Some(language) = transcription.language {
                self.transcription_language = language;
            }
            if let Some(secs) = transcription.timeout_secs {
                self.transcription_timeout_secs = secs;
            }
        }
        if let Some(correction) = yaml.correction {
            if let Some(model) = correction.model {
                self.correction_model = model;
            }
            if let Some(temperature) = correction.temperature {
                self.correction_temperature = temperature;
            }
            if let Some(max_tokens) = correction.max_tokens {
                self.correction_max_tokens = max_tokens;
            }
            if let Some(secs) = correction.timeout_secs {
                self.correction_timeout_secs = secs;
            }
        }
        if let Some(security) = yaml.security {
            if let Some(origins) = security.cors_allowed_origins {
                self.cors_allowed_origins = Some(origins);
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be non-zero".to_string()));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max upload size must be non-zero".to_string(),
            ));
        }
        if self.transcription_timeout_secs == 0 || self.correction_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "remote call timeouts must be non-zero".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.correction_temperature) {
            return Err(ConfigError::Invalid(format!(
                "correction temperature {} outside 0.0..=2.0",
                self.correction_temperature
            )));
        }
        if self.openai_base_url.is_empty() {
            return Err(ConfigError::Invalid(
                "OpenAI base URL must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env_string(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                name: name.to_string(),
                value,
            }),
    }
}
