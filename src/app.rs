//! Application flows wiring the editor to persistence and history.

use crate::ai::{conversation, GeminiEditClient, ImageEditService};
use crate::models::{
    Config, Conversation, ConversationTurn, EditRequest, EditedUpload, GenerationResult,
    ImagePayload, ProcessedImage,
};
use crate::storage::{validate_upload_name, ImageStore, LocalImageStore, StoredImage};
use crate::{Error, Result};
use tracing::{error, info};

/// Coordinates image editing and result persistence.
pub struct App {
    editor: Box<dyn ImageEditService>,
    store: Box<dyn ImageStore>,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub editor: Box<dyn ImageEditService>,
    pub store: Box<dyn ImageStore>,
}

fn validate_prompt(prompt: &str, message: &str) -> Result<String> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(message.to_string()));
    }
    Ok(trimmed.to_string())
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices) -> Self {
        Self {
            editor: services.editor,
            store: services.store,
        }
    }

    /// Construct an app from environment-derived configuration.
    pub fn new(config: &Config) -> Result<Self> {
        // One connection pool for the lifetime of the process.
        let http_client = reqwest::Client::new();

        let editor = GeminiEditClient::new_with_client(
            config.gemini_api_key.clone(),
            config.image_model.clone(),
            config.request_timeout,
            http_client,
        )
        .with_base_url(config.gemini_base_url.clone());
        info!("Image provider: Gemini (model: {})", editor.model());

        let store = LocalImageStore::new(&config.uploads_dir, &config.results_dir)?;
        info!(
            "Storing uploads in {} and results in {}",
            config.uploads_dir.display(),
            config.results_dir.display()
        );

        Ok(Self::with_services(AppServices {
            editor: Box::new(editor),
            store: Box::new(store),
        }))
    }

    async fn edit_and_store(
        &self,
        request: &EditRequest,
        suffix: &str,
    ) -> Result<(GenerationResult, StoredImage)> {
        let result = self.editor.edit_image(request).await.map_err(|e| {
            error!("Error processing image: {}", e);
            e
        })?;
        let stored = self.store.save_result(&result.image_bytes, suffix).await?;
        info!("Saved edited image as {}", stored.filename);
        Ok((result, stored))
    }

    /// Edits with caller-supplied history and returns the API response body.
    pub async fn process_image(
        &self,
        prompt: &str,
        image: Option<ImagePayload>,
        history: Vec<ConversationTurn>,
    ) -> Result<ProcessedImage> {
        let prompt = validate_prompt(prompt, "Prompt is required")?;

        let mut request = EditRequest::new(prompt).with_history(history);
        request.image = image;

        let (result, stored) = self.edit_and_store(&request, "generated").await?;
        Ok(ProcessedImage {
            success: true,
            image: result.to_data_uri(),
            description: result.description,
            filename: stored.filename,
        })
    }

    /// Edits within a running conversation and records the exchange on
    /// success. Failed edits leave the conversation untouched.
    ///
    /// File images are inlined first so later turns still see them.
    pub async fn continue_conversation(
        &self,
        history: &mut Conversation,
        prompt: &str,
        image: Option<ImagePayload>,
    ) -> Result<ProcessedImage> {
        let prompt = validate_prompt(prompt, "Prompt is required")?;

        let image = match image {
            Some(image) => Some(conversation::inline_image(image).await?),
            None => None,
        };
        let mut request = EditRequest::new(prompt).with_history(history.turns.clone());
        request.image = image;

        let (result, stored) = self.edit_and_store(&request, "generated").await?;
        history.record_exchange(&request.prompt, request.image.as_ref(), &result);

        Ok(ProcessedImage {
            success: true,
            image: result.to_data_uri(),
            description: result.description,
            filename: stored.filename,
        })
    }

    /// Stores an uploaded file, edits it without history and stores the
    /// result next to it.
    pub async fn edit_upload(
        &self,
        file_name: &str,
        data: &[u8],
        prompt: &str,
    ) -> Result<EditedUpload> {
        if file_name.trim().is_empty() {
            return Err(Error::Validation("No file selected".to_string()));
        }
        let prompt = validate_prompt(prompt, "Please enter an editing instruction")?;
        validate_upload_name(file_name)?;

        let original = self.store.save_upload(file_name, data).await?;
        info!("Saved upload {} as {}", file_name, original.filename);

        let request = EditRequest::new(prompt).with_image(ImagePayload::File(original.path));
        let (result, edited) = self.edit_and_store(&request, "edited").await?;

        Ok(EditedUpload {
            original_filename: original.filename,
            edited_filename: edited.filename,
            prompt: request.prompt,
            description: result.description,
        })
    }
}
