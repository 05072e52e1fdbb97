//! AI service integration for conversational image editing
//!
//! Formats stored conversation history into Gemini requests, calls the
//! image-capable model and extracts the edited image.

pub mod conversation;
pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::GeminiEditClient;
pub use mock::MockImageEditClient;

use crate::models::{EditRequest, GenerationResult};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ImageEditService: Send + Sync {
    async fn edit_image(&self, request: &EditRequest) -> Result<GenerationResult>;
}

#[async_trait]
impl<T: ImageEditService + ?Sized> ImageEditService for std::sync::Arc<T> {
    async fn edit_image(&self, request: &EditRequest) -> Result<GenerationResult> {
        (**self).edit_image(request).await
    }
}
