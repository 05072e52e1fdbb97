use super::ImageEditService;
use crate::models::{EditRequest, GenerationResult};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Tiny valid 1x1 PNG returned when no response is configured.
pub const DEFAULT_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
    0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1 pixel
    0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44,
    0x41, // IDAT chunk
    0x54, 0x08, 0x99, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0xE2, 0x25,
    0x00, 0xBC, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, // IEND chunk
    0x44, 0xAE, 0x42, 0x60, 0x82,
];

pub struct MockImageEditClient {
    responses: Arc<Mutex<Vec<GenerationResult>>>,
    requests: Arc<Mutex<Vec<EditRequest>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockImageEditClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_response(self, response: GenerationResult) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn get_requests(&self) -> Vec<EditRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockImageEditClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageEditService for MockImageEditClient {
    async fn edit_image(&self, request: &EditRequest) -> Result<GenerationResult> {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        if *self.should_fail.lock().unwrap() {
            return Err(Error::GenerationFailed);
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(GenerationResult::new(
                DEFAULT_PNG.to_vec(),
                Some(format!("Edited: {}", request.prompt)),
            ))
        } else {
            let index = (count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_default_response_is_png() {
        let client = MockImageEditClient::new();

        let result = client
            .edit_image(&EditRequest::new("make it night"))
            .await
            .unwrap();

        assert_eq!(&result.image_bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);
        assert_eq!(result.description.as_deref(), Some("Edited: make it night"));
    }

    #[tokio::test]
    async fn test_mock_cycles_custom_responses() {
        let client = MockImageEditClient::new()
            .with_response(GenerationResult::new(vec![1], None))
            .with_response(GenerationResult::new(vec![2], None));

        let request = EditRequest::new("x");
        assert_eq!(client.edit_image(&request).await.unwrap().image_bytes, vec![1]);
        assert_eq!(client.edit_image(&request).await.unwrap().image_bytes, vec![2]);
        assert_eq!(client.edit_image(&request).await.unwrap().image_bytes, vec![1]);
        assert_eq!(client.get_call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_failure_still_records_request() {
        let client = MockImageEditClient::new().with_failure(true);

        let err = client.edit_image(&EditRequest::new("x")).await.unwrap_err();

        assert!(matches!(err, Error::GenerationFailed));
        assert_eq!(client.get_requests()[0].prompt, "x");
    }
}
