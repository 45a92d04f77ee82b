//! Image generation backends
//!
//! The studio talks to the model through [`ImageGenerationService`]: one
//! prompt, one settings snapshot and an optional reference image in, one
//! data-URI out. [`GeminiImageClient`] is the production implementation.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::GeminiImageClient;
pub use mock::MockImageGenerationClient;

use crate::models::{GenerationOutput, GenerationSettings, ReferenceImage};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Issue exactly one generation request. Every failure is reported as
    /// [`crate::Error::GenerationFailed`].
    async fn generate(
        &self,
        prompt: &str,
        settings: &GenerationSettings,
        reference_image: Option<&ReferenceImage>,
    ) -> Result<GenerationOutput>;
}
