use super::{validate_upload_name, ImageStore, StoredImage};
use crate::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub struct LocalImageStore {
    uploads_dir: PathBuf,
    results_dir: PathBuf,
}

impl LocalImageStore {
    pub fn new(uploads_dir: &Path, results_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(uploads_dir)?;
        std::fs::create_dir_all(results_dir)?;
        Ok(Self {
            uploads_dir: uploads_dir.to_path_buf(),
            results_dir: results_dir.to_path_buf(),
        })
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    async fn write(dir: &Path, filename: String, data: &[u8]) -> Result<StoredImage> {
        let path = dir.join(&filename);
        tokio::fs::write(&path, data).await?;
        tracing::debug!("Saved {} bytes to {}", data.len(), path.display());
        Ok(StoredImage { filename, path })
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save_upload(&self, original_name: &str, data: &[u8]) -> Result<StoredImage> {
        let ext = validate_upload_name(original_name)?;
        let filename = format!("{}_original.{}", Uuid::new_v4(), ext);
        Self::write(&self.uploads_dir, filename, data).await
    }

    async fn save_result(&self, data: &[u8], suffix: &str) -> Result<StoredImage> {
        let filename = format!("{}_{}.png", Uuid::new_v4(), suffix);
        Self::write(&self.results_dir, filename, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use tempfile::TempDir;

    struct TestStore {
        store: LocalImageStore,
        _temp_dir: TempDir,
    }

    impl TestStore {
        fn new() -> Self {
            let temp_dir = TempDir::new().unwrap();
            let store = LocalImageStore::new(
                &temp_dir.path().join("static/uploads"),
                &temp_dir.path().join("static/results"),
            )
            .unwrap();
            Self {
                store,
                _temp_dir: temp_dir,
            }
        }
    }

    #[tokio::test]
    async fn test_new_creates_directories() {
        let test_store = TestStore::new();
        assert!(test_store.store.uploads_dir().is_dir());
        assert!(test_store.store.results_dir().is_dir());
    }

    #[tokio::test]
    async fn test_save_upload_keeps_lowercased_extension() {
        let test_store = TestStore::new();

        let stored = test_store
            .store
            .save_upload("Holiday.JPG", b"jpeg bytes")
            .await
            .unwrap();

        assert!(stored.filename.ends_with("_original.jpg"));
        assert!(stored.path.starts_with(test_store.store.uploads_dir()));
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"jpeg bytes");
    }

    #[tokio::test]
    async fn test_save_upload_rejects_bad_extension() {
        let test_store = TestStore::new();

        let err = test_store
            .store
            .save_upload("script.sh", b"#!/bin/sh")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_save_result_uses_suffix_and_png() {
        let test_store = TestStore::new();

        let stored = test_store
            .store
            .save_result(&[0x89, 0x50, 0x4E, 0x47], "generated")
            .await
            .unwrap();

        assert!(stored.filename.ends_with("_generated.png"));
        assert!(stored.path.starts_with(test_store.store.results_dir()));
        assert!(stored.path.exists());
    }

    #[tokio::test]
    async fn test_unique_filenames() {
        let test_store = TestStore::new();

        let first = test_store.store.save_result(&[1], "edited").await.unwrap();
        let second = test_store.store.save_result(&[1], "edited").await.unwrap();

        assert_ne!(first.filename, second.filename);
    }
}
