//! Conversational image editor backed by Gemini image generation
//!
//! Turns an editing instruction, an optional image and the prior conversation
//! into a Gemini `generateContent` request, then extracts the edited image and
//! its description, retrying once with a context-free prompt when the model
//! answers without an image.

pub mod ai;
pub mod app;
pub mod error;
pub mod models;
pub mod prompts;
pub mod storage;

pub use error::{Error, Result};
