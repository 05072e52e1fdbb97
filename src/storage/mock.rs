use super::{validate_upload_name, ImageStore, StoredImage};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// In-memory store keyed by generated file name.
#[derive(Clone)]
pub struct MockImageStore {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    base_path: PathBuf,
    should_fail: Arc<Mutex<bool>>,
}

impl MockImageStore {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            base_path: PathBuf::from("/tmp"),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_base_path(mut self, path: PathBuf) -> Self {
        self.base_path = path;
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_files(&self) -> HashMap<String, Vec<u8>> {
        self.files.lock().unwrap().clone()
    }

    pub fn get_save_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    fn store(&self, filename: String, data: &[u8]) -> Result<StoredImage> {
        if *self.should_fail.lock().unwrap() {
            return Err(Error::Io(std::io::Error::other("Mock failure")));
        }
        self.files
            .lock()
            .unwrap()
            .insert(filename.clone(), data.to_vec());
        Ok(StoredImage {
            path: self.base_path.join(&filename),
            filename,
        })
    }
}

impl Default for MockImageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageStore for MockImageStore {
    async fn save_upload(&self, original_name: &str, data: &[u8]) -> Result<StoredImage> {
        let ext = validate_upload_name(original_name)?;
        self.store(format!("{}_original.{}", Uuid::new_v4(), ext), data)
    }

    async fn save_result(&self, data: &[u8], suffix: &str) -> Result<StoredImage> {
        self.store(format!("{}_{}.png", Uuid::new_v4(), suffix), data)
    }
}
