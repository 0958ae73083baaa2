use serde::Deserialize;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration; anything left
/// out falls back to the environment variable or the built-in default.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 5000
///
/// storage:
///   upload_folder: "uploads"
///   result_folder: "results"
///   dictionary_path: "dictionary.json"
///   max_upload_mb: 32
///
/// openai:
///   base_url: "https://api.openai.com/v1"
///
/// transcription:
///   model: "whisper-1"
///   language: "ja"
///   timeout_secs: 300
///
/// correction:
///   model: "gpt-4o"
///   temperature: 0.3
///   max_tokens: 4000
///   timeout_secs: 180
///
/// security:
///   cors_allowed_origins: "*"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub storage: Option<StorageYaml>,
    pub openai: Option<OpenAiYaml>,
    pub transcription: Option<TranscriptionYaml>,
    pub correction: Option<CorrectionYaml>,
    pub security: Option<SecurityYaml>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StorageYaml {
    pub upload_folder: Option<String>,
    pub result_folder: Option<String>,
    pub dictionary_path: Option<String>,
    pub max_upload_mb: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct OpenAiYaml {
    /// Override the OpenAI API base URL (mock servers, compatible proxies).
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TranscriptionYaml {
    pub model: Option<String>,
    pub language: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CorrectionYaml {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    /// CORS allowed origins (comma-separated list or "*" for all)
    pub cors_allowed_origins: Option<String>,
}
