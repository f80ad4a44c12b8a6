//! Error types for Habit Coach.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors raised while wiring the service at startup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration file {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the chat completion endpoint.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error(
        "GitHub Models API token is not configured. Set GitHubModels.ApiToken \
         (or GITHUB_MODELS_API_TOKEN) in your configuration."
    )]
    MissingToken,

    #[error("API call failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("Invalid response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },
}

/// Errors that abort a questions or plan request.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Model output is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model output does not match the expected schema: {0}")]
    Schema(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<JsonRejection> for PlanError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for PlanError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

/// Result type alias for startup wiring.
pub type Result<T> = std::result::Result<T, Error>;
