//! Session state for one studio run.
//!
//! [`Studio`] owns everything the user sees: the prompt being edited, the
//! attached reference image, the active settings, the gallery and the last
//! error. A generation is split into [`Studio::begin_generation`] and
//! [`Studio::complete_generation`] so the transition rules can be exercised
//! without a network call; [`Studio::submit`] chains both around one
//! awaited request.

use crate::ai::ImageGenerationService;
use crate::models::{
    AspectRatio, GeneratedImage, GenerationOutput, GenerationSettings, ReferenceImage,
};
use crate::presets::StylePreset;
use crate::Result;
use tracing::{info, warn};

const UNEXPECTED_ERROR: &str = "An unexpected error occurred during generation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStatus {
    Idle,
    Generating,
}

/// Snapshot taken when a generation starts. Later edits to the studio do
/// not leak into it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingGeneration {
    pub prompt: String,
    pub settings: GenerationSettings,
    pub reference_image: Option<ReferenceImage>,
}

impl PendingGeneration {
    fn record_prompt(&self) -> String {
        if !self.prompt.is_empty() {
            self.prompt.clone()
        } else if self.reference_image.is_some() {
            "Image modification".to_string()
        } else {
            "Untitled".to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Nothing to submit, or a generation is already running.
    Skipped,
    Generated(GeneratedImage),
    Failed(String),
}

#[derive(Debug)]
pub struct Studio {
    prompt: String,
    reference_image: Option<ReferenceImage>,
    settings: GenerationSettings,
    gallery: Vec<GeneratedImage>,
    selected: Option<String>,
    status: GenerationStatus,
    error: Option<String>,
}

impl Default for Studio {
    fn default() -> Self {
        Self::new(GenerationSettings::default())
    }
}

impl Studio {
    pub fn new(settings: GenerationSettings) -> Self {
        Self {
            prompt: String::new(),
            reference_image: None,
            settings,
            gallery: Vec::new(),
            selected: None,
            status: GenerationStatus::Idle,
            error: None,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn reference_image(&self) -> Option<&ReferenceImage> {
        self.reference_image.as_ref()
    }

    pub fn attach_reference(&mut self, image: ReferenceImage) {
        self.reference_image = Some(image);
    }

    pub fn remove_reference(&mut self) {
        self.reference_image = None;
    }

    /// Clear prompt and reference image. Allowed in any state.
    pub fn reset(&mut self) {
        self.prompt.clear();
        self.reference_image = None;
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: AspectRatio) {
        self.settings.aspect_ratio = aspect_ratio;
    }

    pub fn select_style(&mut self, preset: &StylePreset) {
        self.settings.style = preset.prompt_suffix.to_string();
    }

    pub fn set_style(&mut self, suffix: impl Into<String>) {
        self.settings.style = suffix.into();
    }

    /// Newest first.
    pub fn gallery(&self) -> &[GeneratedImage] {
        &self.gallery
    }

    pub fn find(&self, id: &str) -> Option<&GeneratedImage> {
        self.gallery.iter().find(|image| image.id == id)
    }

    pub fn selected(&self) -> Option<&GeneratedImage> {
        self.selected.as_deref().and_then(|id| self.find(id))
    }

    /// Open a record in the viewer. Unknown ids leave the selection alone.
    pub fn view(&mut self, id: &str) -> Option<&GeneratedImage> {
        let index = self.gallery.iter().position(|image| image.id == id)?;
        self.selected = Some(id.to_string());
        self.gallery.get(index)
    }

    pub fn close_viewer(&mut self) {
        self.selected = None;
    }

    pub fn status(&self) -> GenerationStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True when a submission would start a generation.
    pub fn can_submit(&self) -> bool {
        self.status == GenerationStatus::Idle
            && (!self.prompt.trim().is_empty() || self.reference_image.is_some())
    }

    /// Enter `Generating` and snapshot the inputs, or do nothing.
    pub fn begin_generation(&mut self) -> Option<PendingGeneration> {
        if !self.can_submit() {
            return None;
        }

        self.status = GenerationStatus::Generating;
        self.error = None;

        Some(PendingGeneration {
            prompt: self.prompt.clone(),
            settings: self.settings.clone(),
            reference_image: self.reference_image.clone(),
        })
    }

    /// Apply the outcome of a generation started by
    /// [`Studio::begin_generation`] and return to `Idle`.
    pub fn complete_generation(
        &mut self,
        pending: PendingGeneration,
        result: Result<GenerationOutput>,
    ) -> SubmitOutcome {
        self.status = GenerationStatus::Idle;

        match result {
            Ok(output) => {
                let record = GeneratedImage::new(pending.record_prompt(), pending.settings, output);
                info!("Generated image {} ({} in gallery)", record.id, self.gallery.len() + 1);

                self.selected = Some(record.id.clone());
                self.gallery.insert(0, record.clone());
                SubmitOutcome::Generated(record)
            }
            Err(e) => {
                let message = e.to_string();
                let message = if message.is_empty() {
                    UNEXPECTED_ERROR.to_string()
                } else {
                    message
                };
                warn!("Generation failed: {}", message);

                self.error = Some(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    pub async fn submit(&mut self, service: &dyn ImageGenerationService) -> SubmitOutcome {
        let Some(pending) = self.begin_generation() else {
            return SubmitOutcome::Skipped;
        };

        let result = service
            .generate(
                &pending.prompt,
                &pending.settings,
                pending.reference_image.as_ref(),
            )
            .await;

        self.complete_generation(pending, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockImageGenerationClient;
    use crate::presets;
    use crate::Error;
    use pretty_assertions::assert_eq;

    fn png_reference() -> ReferenceImage {
        ReferenceImage::from_bytes(&[0x89, 0x50, 0x4E, 0x47])
    }

    fn output(b64: &str) -> GenerationOutput {
        GenerationOutput {
            url: format!("data:image/png;base64,{}", b64),
            grounding_chunks: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_blank_prompt_without_reference_is_noop() {
        let client = MockImageGenerationClient::new();
        let mut studio = Studio::default();
        studio.set_prompt("   ");

        let outcome = studio.submit(&client).await;

        assert_eq!(outcome, SubmitOutcome::Skipped);
        assert_eq!(client.get_call_count(), 0);
        assert_eq!(studio.status(), GenerationStatus::Idle);
        assert!(studio.gallery().is_empty());
    }

    #[test]
    fn test_begin_clears_previous_error() {
        let mut studio = Studio::default();
        studio.set_prompt("a fox");
        let pending = studio.begin_generation().unwrap();
        studio.complete_generation(pending, Err(Error::GenerationFailed("boom".to_string())));
        assert_eq!(studio.error(), Some("boom"));

        let _pending = studio.begin_generation().unwrap();
        assert_eq!(studio.error(), None);
        assert_eq!(studio.status(), GenerationStatus::Generating);
    }

    #[test]
    fn test_second_begin_while_generating_is_refused() {
        let mut studio = Studio::default();
        studio.set_prompt("a fox");

        assert!(studio.begin_generation().is_some());
        assert!(!studio.can_submit());
        assert!(studio.begin_generation().is_none());
    }

    #[tokio::test]
    async fn test_success_prepends_and_selects() {
        let client = MockImageGenerationClient::new()
            .with_image_response("AAAA")
            .with_image_response("BBBB");
        let mut studio = Studio::default();

        studio.set_prompt("first");
        let first = match studio.submit(&client).await {
            SubmitOutcome::Generated(record) => record,
            other => panic!("unexpected outcome: {:?}", other),
        };

        studio.set_prompt("second");
        let second = match studio.submit(&client).await {
            SubmitOutcome::Generated(record) => record,
            other => panic!("unexpected outcome: {:?}", other),
        };

        assert_eq!(studio.gallery().len(), 2);
        assert_eq!(studio.gallery()[0], second);
        assert_eq!(studio.gallery()[1], first);
        assert_eq!(studio.selected(), Some(&second));
        assert_eq!(studio.status(), GenerationStatus::Idle);
        assert_eq!(second.url, "data:image/png;base64,BBBB");
    }

    #[tokio::test]
    async fn test_failure_keeps_gallery_and_records_error() {
        let client = MockImageGenerationClient::new()
            .with_image_response("AAAA")
            .with_failure("I can't draw that.");
        let mut studio = Studio::default();

        studio.set_prompt("ok");
        studio.submit(&client).await;
        let before = studio.gallery().to_vec();

        studio.set_prompt("not ok");
        let outcome = studio.submit(&client).await;

        assert_eq!(outcome, SubmitOutcome::Failed("I can't draw that.".to_string()));
        assert_eq!(studio.gallery(), before.as_slice());
        assert_eq!(studio.error(), Some("I can't draw that."));
        assert_eq!(studio.status(), GenerationStatus::Idle);
    }

    #[test]
    fn test_empty_error_message_uses_fallback() {
        let mut studio = Studio::default();
        studio.set_prompt("x");
        let pending = studio.begin_generation().unwrap();

        let outcome =
            studio.complete_generation(pending, Err(Error::GenerationFailed(String::new())));

        assert_eq!(outcome, SubmitOutcome::Failed(UNEXPECTED_ERROR.to_string()));
    }

    #[test]
    fn test_record_keeps_submission_settings() {
        let mut studio = Studio::default();
        studio.set_prompt("a canyon");
        studio.set_aspect_ratio(AspectRatio::Cinema);
        let pending = studio.begin_generation().unwrap();

        // User fiddles with settings while the request is in flight.
        studio.set_aspect_ratio(AspectRatio::Mobile);
        studio.select_style(presets::find("anime").unwrap());

        let outcome = studio.complete_generation(pending, Ok(output("AAAA")));
        let SubmitOutcome::Generated(record) = outcome else {
            panic!("expected a record");
        };
        assert_eq!(record.settings.aspect_ratio, AspectRatio::Cinema);
        assert_eq!(record.settings.style, presets::default_preset().prompt_suffix);
    }

    #[tokio::test]
    async fn test_reference_only_submission_is_labelled() {
        let client = MockImageGenerationClient::new();
        let mut studio = Studio::default();
        studio.attach_reference(png_reference());

        let outcome = studio.submit(&client).await;

        let SubmitOutcome::Generated(record) = outcome else {
            panic!("expected a record");
        };
        assert_eq!(record.prompt, "Image modification");
        assert_eq!(client.get_calls()[0].reference_image, Some(png_reference()));
    }

    #[tokio::test]
    async fn test_submit_passes_untrimmed_prompt_and_style() {
        let client = MockImageGenerationClient::new();
        let mut studio = Studio::default();
        studio.set_prompt(" a lake ");
        studio.set_style(", watercolor");

        studio.submit(&client).await;

        let call = &client.get_calls()[0];
        assert_eq!(call.prompt, " a lake ");
        assert_eq!(call.settings.style, ", watercolor");
    }

    #[test]
    fn test_reset_clears_prompt_and_reference_only() {
        let mut studio = Studio::default();
        studio.set_prompt("a fox");
        studio.attach_reference(png_reference());
        let pending = studio.begin_generation().unwrap();
        studio.complete_generation(pending, Ok(output("AAAA")));

        studio.reset();

        assert_eq!(studio.prompt(), "");
        assert!(studio.reference_image().is_none());
        assert_eq!(studio.gallery().len(), 1);
        assert!(studio.selected().is_some());
    }

    #[test]
    fn test_reset_while_generating_keeps_status() {
        let mut studio = Studio::default();
        studio.set_prompt("a fox");
        let _pending = studio.begin_generation().unwrap();

        studio.reset();

        assert_eq!(studio.status(), GenerationStatus::Generating);
    }

    #[test]
    fn test_view_and_close() {
        let mut studio = Studio::default();
        studio.set_prompt("a fox");
        let pending = studio.begin_generation().unwrap();
        let SubmitOutcome::Generated(record) =
            studio.complete_generation(pending, Ok(output("AAAA")))
        else {
            panic!("expected a record");
        };

        studio.close_viewer();
        assert!(studio.selected().is_none());

        assert_eq!(studio.view(&record.id).map(|r| r.id.clone()), Some(record.id.clone()));
        assert!(studio.view("missing").is_none());
        assert!(studio.selected().is_some());
        assert_eq!(studio.status(), GenerationStatus::Idle);
    }
}
