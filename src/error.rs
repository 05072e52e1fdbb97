//! Error handling and custom error types
//!
//! Provides unified error handling across the editor using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("No response candidates from Gemini")]
    EmptyResponse,

    #[error("No content parts in response")]
    EmptyContent,

    #[error("Unable to generate image. Try a different prompt.")]
    GenerationFailed,

    #[error("Failed to decode image data: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("{0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
