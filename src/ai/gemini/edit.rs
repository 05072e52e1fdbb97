use super::client::GeminiHttpClient;
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};
use crate::ai::{conversation, ImageEditService};
use crate::models::{EditRequest, GenerationResult};
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// What the primary call yielded, still base64-encoded.
#[derive(Debug, Default, PartialEq, Eq)]
struct Reply {
    description: Option<String>,
    image_data: Option<String>,
}

/// Conversational image editing on top of Gemini's image-capable models.
pub struct GeminiEditClient {
    http: GeminiHttpClient,
}

impl GeminiEditClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, DEFAULT_TIMEOUT, reqwest::Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, model, timeout, client),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn model(&self) -> &str {
        self.http.model()
    }

    async fn generate(&self, contents: Vec<Content>) -> Result<GenerateContentResponse> {
        let request = GenerateContentRequest {
            contents,
            generation_config: GenerationConfig::image_editing(),
        };
        self.http.generate_content(&request).await
    }

    /// Scans every part of the first candidate; later text or image parts
    /// replace earlier ones.
    fn extract_reply(response: &GenerateContentResponse) -> Result<Reply> {
        let candidate = response.candidates.first().ok_or(Error::EmptyResponse)?;
        let parts = match &candidate.content {
            Some(content) if !content.parts.is_empty() => &content.parts,
            _ => return Err(Error::EmptyContent),
        };

        let mut reply = Reply::default();
        for part in parts {
            if let Some(text) = part.non_empty_text() {
                reply.description = Some(text.to_string());
            } else if let Some(inline) = part.non_empty_image() {
                reply.image_data = Some(inline.data.clone());
            }
        }
        Ok(reply)
    }

    /// First image of the fallback answer, if any. Text is ignored.
    fn extract_fallback_image(response: &GenerateContentResponse) -> Option<String> {
        response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .and_then(|content| {
                content
                    .parts
                    .iter()
                    .find_map(|part| part.non_empty_image().map(|inline| inline.data.clone()))
            })
    }

    /// Single context-free retry asking explicitly for an image.
    async fn fallback(&self, prompt: &str) -> Result<String> {
        let contents = vec![Content::user(vec![Part::text(
            prompts::fallback_instruction(prompt),
        )])];

        let response = self.generate(contents).await?;
        Self::extract_fallback_image(&response).ok_or_else(|| {
            tracing::error!("Fallback request returned no image either");
            Error::GenerationFailed
        })
    }

    fn decode(image_data: &str) -> Result<Vec<u8>> {
        Ok(base64::engine::general_purpose::STANDARD.decode(image_data)?)
    }
}

#[async_trait]
impl ImageEditService for GeminiEditClient {
    async fn edit_image(&self, request: &EditRequest) -> Result<GenerationResult> {
        let contents = conversation::build_edit_contents(
            &request.history,
            &request.prompt,
            request.image.as_ref(),
        )
        .await?;

        let response = self.generate(contents).await?;
        let reply = Self::extract_reply(&response)?;

        let image_data = match reply.image_data {
            Some(data) => data,
            None => {
                tracing::warn!(
                    "Gemini answered without an image, retrying without conversation context"
                );
                self.fallback(&request.prompt).await?
            }
        };

        let image_bytes = Self::decode(&image_data)?;
        tracing::debug!(
            "Gemini returned {} image bytes (description: {})",
            image_bytes.len(),
            reply.description.is_some()
        );

        Ok(GenerationResult::new(image_bytes, reply.description))
    }
}
