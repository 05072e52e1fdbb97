//! Local persistence for uploaded originals and generated results
//!
//! Files are written under UUID-based names so concurrent sessions never
//! collide; callers only ever see the returned file name.

pub mod local;
pub mod mock;

pub use local::LocalImageStore;
pub use mock::MockImageStore;

use crate::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;

pub const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub filename: String,
    pub path: PathBuf,
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Saves an uploaded original as `{uuid}_original.{ext}`.
    async fn save_upload(&self, original_name: &str, data: &[u8]) -> Result<StoredImage>;

    /// Saves generated PNG bytes as `{uuid}_{suffix}.png`.
    async fn save_result(&self, data: &[u8], suffix: &str) -> Result<StoredImage>;
}

/// Lowercased extension of an upload name, if it is one we accept.
///
/// The extension is whatever follows the last `.`, so a bare ".png" counts.
pub fn upload_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

pub fn is_allowed_upload(file_name: &str) -> bool {
    upload_extension(file_name).is_some()
}

pub fn validate_upload_name(file_name: &str) -> Result<String> {
    if file_name.trim().is_empty() {
        return Err(Error::Validation("No file selected".to_string()));
    }
    upload_extension(file_name).ok_or_else(|| {
        Error::Validation(
            "Invalid file type. Please upload PNG, JPG, JPEG, GIF, or WebP files.".to_string(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions_are_case_insensitive() {
        assert!(is_allowed_upload("cat.png"));
        assert!(is_allowed_upload("cat.JPG"));
        assert!(is_allowed_upload("archive.tar.webp"));
        assert_eq!(upload_extension("Photo.JPEG").as_deref(), Some("jpeg"));
    }

    #[test]
    fn test_disallowed_extensions() {
        assert!(!is_allowed_upload("cat.bmp"));
        assert!(!is_allowed_upload("cat"));
        assert!(!is_allowed_upload("cat."));
        assert!(!is_allowed_upload("cat.png.exe"));
    }

    #[test]
    fn test_dotfile_names_use_text_after_last_dot() {
        assert!(is_allowed_upload(".png"));
        assert_eq!(upload_extension(".WEBP").as_deref(), Some("webp"));
        assert!(!is_allowed_upload(".bashrc"));
    }

    #[test]
    fn test_validate_upload_name_messages() {
        let err = validate_upload_name("").unwrap_err();
        assert_eq!(err.to_string(), "No file selected");

        let err = validate_upload_name("notes.txt").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().starts_with("Invalid file type"));

        assert_eq!(validate_upload_name("a.gif").unwrap(), "gif");
    }
}
