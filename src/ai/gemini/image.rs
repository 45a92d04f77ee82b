use super::client::GeminiHttpClient;
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImageConfig,
    InlineData, Part,
};
use crate::ai::ImageGenerationService;
use crate::data_uri;
use crate::models::{GenerationOutput, GenerationSettings, ReferenceImage};
use crate::{Error, Result};
use async_trait::async_trait;

const NO_CANDIDATES: &str = "No image generated.";
const NO_IMAGE: &str = "The engine did not return an image.";

/// What the first candidate carried, in priority order.
#[derive(Debug, PartialEq)]
pub enum ResponsePayload<'a> {
    /// Base64 image data; wins over any text part.
    Image(&'a str),
    /// First non-empty text, usually the model explaining a refusal.
    Text(&'a str),
    Neither,
}

impl<'a> ResponsePayload<'a> {
    pub fn classify(parts: &'a [Part]) -> Self {
        let image = parts.iter().find_map(|p| match p {
            Part::InlineData { inline_data } => Some(inline_data.data.as_str()),
            _ => None,
        });
        if let Some(data) = image {
            return ResponsePayload::Image(data);
        }

        parts
            .iter()
            .find_map(|p| match p {
                Part::Text { text } if !text.is_empty() => Some(text.as_str()),
                _ => None,
            })
            .map_or(ResponsePayload::Neither, ResponsePayload::Text)
    }
}

/// Build the ordered request parts: reference image first, then text.
pub(crate) fn build_parts(
    prompt: &str,
    settings: &GenerationSettings,
    reference_image: Option<&ReferenceImage>,
) -> Vec<Part> {
    let text = Part::Text {
        text: format!("{}{}", prompt, settings.style),
    };

    match reference_image {
        Some(image) => vec![
            Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.data.clone(),
                },
            },
            text,
        ],
        None => vec![text],
    }
}

fn interpret(response: GenerateContentResponse) -> Result<GenerationOutput> {
    let Some(candidate) = response.candidates.first() else {
        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            tracing::warn!("Gemini blocked the prompt: {}", reason);
        }
        return Err(Error::GenerationFailed(NO_CANDIDATES.to_string()));
    };

    match ResponsePayload::classify(&candidate.content.parts) {
        ResponsePayload::Image(data) => Ok(GenerationOutput {
            url: data_uri::to_png_data_uri(data),
            grounding_chunks: Vec::new(),
        }),
        ResponsePayload::Text(text) => {
            tracing::warn!("Gemini answered with text instead of an image");
            Err(Error::GenerationFailed(text.to_string()))
        }
        ResponsePayload::Neither => {
            tracing::warn!(
                "Gemini candidate had no usable parts (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            );
            Err(Error::GenerationFailed(NO_IMAGE.to_string()))
        }
    }
}

pub struct GeminiImageClient {
    http: GeminiHttpClient,
}

impl GeminiImageClient {
    pub fn new(api_key: String) -> Self {
        Self::new_with_client(api_key, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, client),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }
}

#[async_trait]
impl ImageGenerationService for GeminiImageClient {
    async fn generate(
        &self,
        prompt: &str,
        settings: &GenerationSettings,
        reference_image: Option<&ReferenceImage>,
    ) -> Result<GenerationOutput> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: None,
                parts: build_parts(prompt, settings, reference_image),
            }],
            generation_config: GenerationConfig {
                image_config: ImageConfig {
                    aspect_ratio: settings.aspect_ratio.to_string(),
                },
            },
        };

        tracing::info!(
            "Requesting image (model: {}, aspect ratio: {}, reference: {})",
            settings.model,
            settings.aspect_ratio,
            reference_image.is_some()
        );

        let response: GenerateContentResponse =
            self.http.generate_content(&settings.model, &request).await?;

        interpret(response)
    }
}
