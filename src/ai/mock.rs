use super::ImageGenerationService;
use crate::data_uri;
use crate::models::{GenerationOutput, GenerationSettings, ReferenceImage};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One call as seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub prompt: String,
    pub settings: GenerationSettings,
    pub reference_image: Option<ReferenceImage>,
}

enum Scripted {
    Image(String),
    Failure(String),
}

/// In-memory stand-in for the Gemini client.
///
/// Scripted outcomes are consumed in order; once exhausted every call
/// returns a tiny PNG.
#[derive(Clone)]
pub struct MockImageGenerationClient {
    outcomes: Arc<Mutex<VecDeque<Scripted>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a successful response carrying this base64 payload.
    pub fn with_image_response(self, b64: impl Into<String>) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Scripted::Image(b64.into()));
        self
    }

    /// Queue a `GenerationFailed` with this message.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Scripted::Failure(message.into()));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn get_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

// 1x1 PNG
const DEFAULT_PNG_B64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAIAAACQd1PeAAAADElEQVQImWP4z8AAAAMBAQDiJQC8AAAAAElFTkSuQmCC";

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate(
        &self,
        prompt: &str,
        settings: &GenerationSettings,
        reference_image: Option<&ReferenceImage>,
    ) -> Result<GenerationOutput> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            settings: settings.clone(),
            reference_image: reference_image.cloned(),
        });

        let next = self.outcomes.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Failure(message)) => Err(Error::GenerationFailed(message)),
            Some(Scripted::Image(b64)) => Ok(GenerationOutput {
                url: data_uri::to_png_data_uri(&b64),
                grounding_chunks: Vec::new(),
            }),
            None => Ok(GenerationOutput {
                url: data_uri::to_png_data_uri(DEFAULT_PNG_B64),
                grounding_chunks: Vec::new(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_default_response_is_png() {
        let client = MockImageGenerationClient::new();
        let output = client
            .generate("apple", &GenerationSettings::default(), None)
            .await
            .unwrap();

        let decoded = data_uri::parse(&output.url).unwrap();
        assert_eq!(&decoded.bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);
    }

    #[tokio::test]
    async fn test_mock_scripted_outcomes_in_order() {
        let client = MockImageGenerationClient::new()
            .with_failure("quota exceeded")
            .with_image_response("AAAA");
        let settings = GenerationSettings::default();

        let err = client.generate("one", &settings, None).await.unwrap_err();
        assert_eq!(err.to_string(), "quota exceeded");

        let output = client.generate("two", &settings, None).await.unwrap();
        assert_eq!(output.url, "data:image/png;base64,AAAA");
    }

    #[tokio::test]
    async fn test_mock_records_calls() {
        let client = MockImageGenerationClient::new();
        assert_eq!(client.get_call_count(), 0);

        let reference = ReferenceImage::from_bytes(&[0x89, 0x50, 0x4E, 0x47]);
        client
            .generate("test", &GenerationSettings::default(), Some(&reference))
            .await
            .unwrap();

        let calls = client.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, "test");
        assert_eq!(calls[0].reference_image.as_ref(), Some(&reference));
    }
}
