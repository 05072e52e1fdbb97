//! Data models and structures
//!
//! Defines the caller-facing conversation types, edit requests and results,
//! and the environment configuration.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const GENERATED_MIME_TYPE: &str = "image/png";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One content unit of a stored turn.
///
/// Images are carried as data URIs exactly as the browser sent them.
/// Anything else (null values, unknown keys) lands in `Other` and is never
/// sent to the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum HistoryPart {
    Text { text: String },
    Image { image: String },
    Other(serde_json::Value),
}

impl HistoryPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image(data_uri: impl Into<String>) -> Self {
        Self::Image {
            image: data_uri.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    #[serde(default)]
    pub parts: Vec<HistoryPart>,
}

impl ConversationTurn {
    pub fn new(role: Role, parts: Vec<HistoryPart>) -> Self {
        Self { role, parts }
    }
}

/// Image attached to a new edit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
    /// `data:<mime>;base64,<data>` as produced by a browser `FileReader`.
    DataUri(String),
    /// Image already on local disk, typically a saved upload.
    File(PathBuf),
}

impl ImagePayload {
    /// Interprets a client-supplied string: data URIs stay inline, anything
    /// else is treated as a path.
    pub fn from_client_value(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.starts_with("data:") {
            Self::DataUri(value)
        } else {
            Self::File(PathBuf::from(value))
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditRequest {
    pub prompt: String,
    pub image: Option<ImagePayload>,
    pub history: Vec<ConversationTurn>,
}

impl EditRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
            history: Vec::new(),
        }
    }

    pub fn with_image(mut self, image: ImagePayload) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = history;
        self
    }
}

/// Decoded output of a successful edit. Gemini always answers in PNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub image_bytes: Vec<u8>,
    pub description: Option<String>,
    pub mime_type: &'static str,
}

impl GenerationResult {
    pub fn new(image_bytes: Vec<u8>, description: Option<String>) -> Self {
        Self {
            image_bytes,
            description,
            mime_type: GENERATED_MIME_TYPE,
        }
    }

    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.image_bytes)
        )
    }
}

/// JSON body returned by the edit API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessedImage {
    pub success: bool,
    pub image: String,
    pub description: Option<String>,
    pub filename: String,
}

/// Outcome of the upload-and-edit flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditedUpload {
    pub original_filename: String,
    pub edited_filename: String,
    pub prompt: String,
    pub description: Option<String>,
}

/// Accumulated history for one editing session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    #[serde(default)]
    pub turns: Vec<ConversationTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the user turn and the model's answer after a successful edit.
    ///
    /// Inline images are kept on the user turn; file images are not, since
    /// the path may not outlive the request, so callers inline them first
    /// (see [`crate::ai::conversation::inline_image`]). The model turn carries the
    /// generated image too, but only its text is ever sent back to Gemini.
    pub fn record_exchange(
        &mut self,
        prompt: &str,
        image: Option<&ImagePayload>,
        result: &GenerationResult,
    ) {
        let mut user_parts = vec![HistoryPart::text(prompt)];
        if let Some(ImagePayload::DataUri(uri)) = image {
            user_parts.push(HistoryPart::image(uri.clone()));
        }
        self.turns.push(ConversationTurn::new(Role::User, user_parts));

        let mut model_parts = Vec::new();
        if let Some(description) = &result.description {
            model_parts.push(HistoryPart::text(description.clone()));
        }
        model_parts.push(HistoryPart::image(result.to_data_uri()));
        self.turns.push(ConversationTurn::new(Role::Model, model_parts));
    }

    pub fn reset(&mut self) {
        self.turns.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

// Configuration
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-exp-image-generation";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub image_model: String,
    pub gemini_base_url: String,
    pub request_timeout: Duration,
    pub uploads_dir: PathBuf,
    pub results_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| crate::Error::Config("GEMINI_API_KEY not set".to_string()))?;

        let request_timeout = match lookup("GEMINI_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|_| {
                crate::Error::Config(format!(
                    "GEMINI_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    raw
                ))
            })?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            gemini_api_key,
            image_model: lookup("GEMINI_IMAGE_MODEL")
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            gemini_base_url: lookup("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            request_timeout,
            uploads_dir: lookup("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static/uploads")),
            results_dir: lookup("RESULTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static/results")),
        })
    }
}
