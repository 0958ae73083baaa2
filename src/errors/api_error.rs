//! The API error type and its HTTP mapping.
//!
//! Every failure a caller can observe flows through [`ApiError`], which
//! renders as a JSON body of the form `{"error": "..."}`. Remote-service
//! failures are classified structurally from the upstream HTTP status
//! (401 / 404 / 429) into user-facing hints rather than by matching
//! substrings of upstream error text, which is not a stable contract.
//! Stack traces and upstream bodies never reach the caller; they go to the
//! log instead.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::core::remote::RemoteError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Which remote call failed; selects the label used in generic messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Transcription,
    Correction,
}

impl PipelineStage {
    fn label(self) -> &'static str {
        match self {
            Self::Transcription => "文字起こし",
            Self::Correction => "テキスト整形",
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("OpenAI APIキーが必要です")]
    MissingCredential,

    #[error("ファイルがアップロードされていません")]
    MissingFile,

    #[error("対応していないファイル形式です（拡張子: {extension}, タイプ: {content_type}）")]
    UnsupportedFormat {
        extension: String,
        content_type: String,
    },

    #[error("アップロードされたファイルが空です")]
    EmptyUpload,

    #[error("リクエストの解析に失敗しました")]
    MalformedRequest(String),

    #[error("ファイルの保存に失敗しました")]
    Save(#[source] std::io::Error),

    #[error("{stage:?} call failed")]
    Remote {
        stage: PipelineStage,
        #[source]
        source: RemoteError,
    },

    #[error("サーバー内部エラーが発生しました")]
    Internal(String),
}

impl ApiError {
    pub fn transcription(source: RemoteError) -> Self {
        Self::Remote {
            stage: PipelineStage::Transcription,
            source,
        }
    }

    pub fn correction(source: RemoteError) -> Self {
        Self::Remote {
            stage: PipelineStage::Correction,
            source,
        }
    }

    /// Status code and user-facing message for this error.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::MissingCredential
            | Self::MissingFile
            | Self::UnsupportedFormat { .. }
            | Self::EmptyUpload => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::MalformedRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::Save(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            Self::Remote { stage, source } => classify_remote(*stage, source),
        }
    }
}

/// Map a remote failure to a response the caller can act on.
fn classify_remote(stage: PipelineStage, source: &RemoteError) -> (StatusCode, String) {
    match source {
        RemoteError::Timeout => (
            StatusCode::GATEWAY_TIMEOUT,
            "処理がタイムアウトしました。録音を短くするか、しばらくしてから再試行してください。"
                .to_string(),
        ),
        RemoteError::Transport(_) => (
            StatusCode::BAD_GATEWAY,
            "外部サービスとの通信エラーが発生しました。しばらくしてから再試行してください。"
                .to_string(),
        ),
        RemoteError::Rejected { status: 401, .. } => (
            StatusCode::BAD_GATEWAY,
            "OpenAI APIキーが無効です。キーを確認してください。".to_string(),
        ),
        RemoteError::Rejected { status: 404, .. } => (
            StatusCode::BAD_GATEWAY,
            "指定されたモデルが現在利用できません。".to_string(),
        ),
        RemoteError::Rejected { status: 429, .. } => (
            StatusCode::BAD_GATEWAY,
            "OpenAI APIのレート制限に達しました。しばらく待ってから再試行してください。"
                .to_string(),
        ),
        RemoteError::Rejected { status, .. } => (
            StatusCode::BAD_GATEWAY,
            format!("OpenAI APIエラー（{}）: ステータス {}", stage.label(), status),
        ),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        // Full detail stays in the log; the caller only sees the message.
        if status.is_server_error() {
            error!("Request failed ({status}): {self:?}");
        } else {
            warn!("Request rejected ({status}): {self:?}");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        Self::MalformedRequest(err.to_string())
    }
}
