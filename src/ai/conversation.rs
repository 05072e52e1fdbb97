//! Conversion of stored conversation history into Gemini request contents.
//!
//! History is produced by this application, so malformed entries are
//! skipped rather than rejected. The new request's own image is different:
//! if it points at a file that cannot be read, the edit fails.

use super::gemini::types::{Content, Part};
use super::mime;
use crate::models::{ConversationTurn, HistoryPart, ImagePayload, Role};
use crate::{prompts, Result};
use base64::Engine as _;
use std::path::Path;

/// Converts stored turns into provider contents, dropping unusable parts and
/// any turn left without parts.
pub fn format_history(history: &[ConversationTurn]) -> Vec<Content> {
    history
        .iter()
        .filter_map(|turn| {
            let parts: Vec<Part> = turn
                .parts
                .iter()
                .filter_map(|part| format_part(turn.role, part))
                .collect();

            if parts.is_empty() {
                None
            } else {
                Some(Content {
                    role: Some(role_name(turn.role).to_string()),
                    parts,
                })
            }
        })
        .collect()
}

fn format_part(role: Role, part: &HistoryPart) -> Option<Part> {
    match part {
        HistoryPart::Text { text } if !text.is_empty() => Some(Part::text(text.clone())),
        HistoryPart::Text { .. } => None,
        HistoryPart::Image { image } => match role {
            Role::User => inline_from_data_uri(image),
            Role::Model => None,
        },
        HistoryPart::Other(_) => None,
    }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Model => "model",
    }
}

fn inline_from_data_uri(data_uri: &str) -> Option<Part> {
    let data = mime::data_uri_payload(data_uri)?;
    Some(Part::inline(data, mime::data_uri_mime(data_uri)))
}

async fn read_as_base64(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(base64::engine::general_purpose::STANDARD.encode(&bytes))
}

/// Turns a file image into a data URI so it can be stored in history and
/// replayed on later turns. Data URIs pass through untouched.
pub async fn inline_image(image: ImagePayload) -> Result<ImagePayload> {
    match image {
        ImagePayload::File(path) => {
            let data = read_as_base64(&path).await?;
            Ok(ImagePayload::DataUri(format!(
                "data:{};base64,{}",
                mime::mime_for_extension(&path),
                data
            )))
        }
        inline @ ImagePayload::DataUri(_) => Ok(inline),
    }
}

/// Appends the new user turn (edit instruction plus optional image) to the
/// formatted history.
pub async fn build_edit_contents(
    history: &[ConversationTurn],
    prompt: &str,
    image: Option<&ImagePayload>,
) -> Result<Vec<Content>> {
    let mut contents = format_history(history);

    let mut parts = vec![Part::text(prompts::edit_instruction(prompt))];
    match image {
        Some(ImagePayload::DataUri(uri)) => {
            if let Some(part) = inline_from_data_uri(uri) {
                parts.push(part);
            } else {
                tracing::warn!("Ignoring malformed data URI attached to edit request");
            }
        }
        Some(ImagePayload::File(path)) => {
            let data = read_as_base64(path).await?;
            parts.push(Part::inline(data, mime::mime_for_extension(path)));
        }
        None => {}
    }

    contents.push(Content::user(parts));
    Ok(contents)
}
