//! Application wiring for the terminal studio.

use crate::ai::{GeminiImageClient, ImageGenerationService};
use crate::command::{Command, HELP};
use crate::export::{FileExporter, ImageExporter};
use crate::models::{AspectRatio, Config, GeneratedImage, GenerationSettings, ReferenceImage};
use crate::presets::{self, STYLE_PRESETS};
use crate::session::{GenerationStatus, Studio, SubmitOutcome};
use crate::{Error, Result};
use chrono::Local;
use std::fmt::Write as _;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};
use uuid::Uuid;

/// Owns the generation backend, the exporter and the session state.
pub struct App {
    generator: Box<dyn ImageGenerationService>,
    exporter: Box<dyn ImageExporter>,
    studio: Studio,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub generator: Box<dyn ImageGenerationService>,
    pub exporter: Box<dyn ImageExporter>,
}

/// Inputs of a non-interactive generation.
#[derive(Debug, Clone, Default)]
pub struct OneShotRequest {
    pub prompt: String,
    /// Preset name; the default preset when `None`.
    pub style: Option<String>,
    pub no_style: bool,
    pub aspect_ratio: Option<AspectRatio>,
    pub reference: Option<PathBuf>,
}

/// What the caller should do after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Continue(String),
    Quit,
}

impl App {
    pub fn with_services(services: AppServices, settings: GenerationSettings) -> Self {
        Self {
            generator: services.generator,
            exporter: services.exporter,
            studio: Studio::new(settings),
        }
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    pub fn new() -> Result<Self> {
        let config = Config::from_env()?;

        let date = Local::now().format("%Y-%m-%d").to_string();
        let session_id = Uuid::new_v4();
        let output_dir = config
            .output_dir
            .join(format!("{}_{}", date, session_id));

        // Reuse one HTTP connection pool for generation and downloads.
        let http_client = reqwest::Client::new();

        info!("Image model: {}", config.image_model);
        let generator = GeminiImageClient::new_with_client(config.gemini_api_key, http_client.clone())
            .with_base_url(config.gemini_base_url);
        let exporter = FileExporter::new_with_client(&output_dir, http_client);
        info!("Images will be saved under {}", exporter.output_dir().display());

        Ok(Self::with_services(
            AppServices {
                generator: Box::new(generator),
                exporter: Box::new(exporter),
            },
            GenerationSettings::with_model(config.image_model),
        ))
    }

    pub fn studio(&self) -> &Studio {
        &self.studio
    }

    /// Generate one image and save it. A failed generation is returned as
    /// [`Error::GenerationFailed`].
    pub async fn run_once(&mut self, request: OneShotRequest) -> Result<PathBuf> {
        if request.no_style {
            self.studio.set_style("");
        } else if let Some(name) = request.style.as_deref() {
            let preset = presets::find(name)
                .ok_or_else(|| Error::InvalidInput(format!("Unknown style '{}'", name)))?;
            self.studio.select_style(preset);
        }
        if let Some(ratio) = request.aspect_ratio {
            self.studio.set_aspect_ratio(ratio);
        }
        if let Some(path) = request.reference.as_deref() {
            self.studio
                .attach_reference(ReferenceImage::from_file(path).await?);
        }
        self.studio.set_prompt(request.prompt);

        match self.studio.submit(self.generator.as_ref()).await {
            SubmitOutcome::Generated(record) => {
                self.exporter
                    .save(&record.url, &record.download_filename())
                    .await
            }
            SubmitOutcome::Failed(message) => Err(Error::GenerationFailed(message)),
            SubmitOutcome::Skipped => Err(Error::InvalidInput(
                "Nothing to generate: give a prompt or a reference image".to_string(),
            )),
        }
    }

    /// Read commands line by line until `quit` or end of input.
    pub async fn run_interactive<R, W>(&mut self, mut input: R, mut output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        output
            .write_all(b"Welcome to the studio. Type `help` for commands.\n")
            .await?;
        output.flush().await?;

        // Raw lines, so one undecodable line is rejected on its own instead of
        // ending the session.
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let parsed = std::str::from_utf8(&buf)
                .map_err(|_| Error::InvalidInput("line is not valid UTF-8".to_string()))
                .and_then(|line| Command::parse(line.trim_end_matches(['\n', '\r'])));
            let reply = match parsed {
                Ok(Some(command)) => match self.execute(command).await {
                    Ok(reply) => reply,
                    Err(e) => {
                        warn!("Command failed: {}", e);
                        Reply::Continue(format!("error: {}", e))
                    }
                },
                Ok(None) => continue,
                Err(e) => Reply::Continue(format!("error: {}", e)),
            };

            match reply {
                Reply::Continue(text) => {
                    if !text.is_empty() {
                        output.write_all(text.as_bytes()).await?;
                        output.write_all(b"\n").await?;
                    }
                    output.flush().await?;
                }
                Reply::Quit => break,
            }
        }

        info!("Leaving studio with {} image(s)", self.studio.gallery().len());
        Ok(())
    }

    pub async fn execute(&mut self, command: Command) -> Result<Reply> {
        let text = match command {
            Command::Prompt(text) => {
                self.studio.set_prompt(text);
                String::new()
            }
            Command::Style(name) => {
                let preset = presets::find(&name)
                    .ok_or_else(|| Error::InvalidInput(format!("Unknown style '{}'", name)))?;
                self.studio.select_style(preset);
                format!("Style: {}", preset.name)
            }
            Command::Suffix(suffix) => {
                self.studio.set_style(suffix);
                format!("Style: {}", self.style_label())
            }
            Command::Styles { json: true } => serde_json::to_string_pretty(STYLE_PRESETS)?,
            Command::Styles { json: false } => self.list_styles(),
            Command::Ratio(ratio) => {
                self.studio.set_aspect_ratio(ratio);
                format!("Aspect ratio: {}", ratio.label())
            }
            Command::Ratios => AspectRatio::ALL
                .iter()
                .map(|ratio| format!("  {}", ratio.label()))
                .collect::<Vec<_>>()
                .join("\n"),
            Command::Reference(path) => {
                let image = ReferenceImage::from_file(&path).await?;
                let mime_type = image.mime_type.clone();
                self.studio.attach_reference(image);
                format!("Reference image attached ({})", mime_type)
            }
            Command::Unreference => {
                self.studio.remove_reference();
                "Reference image removed".to_string()
            }
            Command::Reset => {
                self.studio.reset();
                "Prompt and reference image cleared".to_string()
            }
            Command::Generate => self.generate().await,
            Command::Gallery { json: true } => serde_json::to_string_pretty(self.studio.gallery())?,
            Command::Gallery { json: false } => self.list_gallery(),
            Command::View { id, json } => {
                let record = self
                    .studio
                    .view(&id)
                    .ok_or_else(|| Error::NotFound(format!("No image with id '{}'", id)))?;
                if json {
                    serde_json::to_string_pretty(record)?
                } else {
                    describe(record)
                }
            }
            Command::Close => {
                self.studio.close_viewer();
                String::new()
            }
            Command::Save(id) => {
                let path = self.save(id.as_deref()).await?;
                format!("Saved to {}", path.display())
            }
            Command::Status => self.status_report(),
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Reply::Quit),
        };

        Ok(Reply::Continue(text))
    }

    async fn generate(&mut self) -> String {
        if !self.studio.can_submit() {
            return "Enter a prompt or attach a reference image first".to_string();
        }

        match self.studio.submit(self.generator.as_ref()).await {
            SubmitOutcome::Generated(record) => describe(&record),
            SubmitOutcome::Failed(message) => format!("Generation failed: {}", message),
            SubmitOutcome::Skipped => String::new(),
        }
    }

    async fn save(&self, id: Option<&str>) -> Result<PathBuf> {
        let record = match id {
            Some(id) => self.studio.find(id),
            None => self.studio.selected(),
        }
        .ok_or_else(|| match id {
            Some(id) => Error::NotFound(format!("No image with id '{}'", id)),
            None => Error::NotFound("No image is being viewed".to_string()),
        })?;

        self.exporter
            .save(&record.url, &record.download_filename())
            .await
    }

    fn style_label(&self) -> String {
        let style = &self.studio.settings().style;
        match presets::by_suffix(style) {
            Some(preset) => preset.name.to_string(),
            None if style.is_empty() => "none".to_string(),
            None => format!("custom ({})", style.trim_start_matches(", ")),
        }
    }

    fn list_styles(&self) -> String {
        let active = &self.studio.settings().style;
        STYLE_PRESETS
            .iter()
            .map(|preset| {
                let marker = if preset.prompt_suffix == active.as_str() { '*' } else { ' ' };
                format!("{} {}", marker, preset.name)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn list_gallery(&self) -> String {
        let gallery = self.studio.gallery();
        if gallery.is_empty() {
            return "Your creations will appear here".to_string();
        }

        let mut text = format!("{} creation(s)", gallery.len());
        for record in gallery {
            let _ = write!(
                text,
                "\n  {}  {}  {}  {}",
                record.id,
                record.timestamp.format("%H:%M:%S"),
                record.settings.aspect_ratio,
                record.prompt
            );
        }
        text
    }

    fn status_report(&self) -> String {
        let studio = &self.studio;
        let mut text = String::new();
        let state = match studio.status() {
            GenerationStatus::Idle => "idle",
            GenerationStatus::Generating => "generating",
        };
        let _ = writeln!(text, "State:        {}", state);
        let _ = writeln!(text, "Prompt:       {}", studio.prompt());
        let _ = writeln!(
            text,
            "Reference:    {}",
            studio
                .reference_image()
                .map(|image| image.mime_type.as_str())
                .unwrap_or("none")
        );
        let _ = writeln!(text, "Style:        {}", self.style_label());
        let _ = writeln!(text, "Aspect ratio: {}", studio.settings().aspect_ratio.label());
        let _ = writeln!(text, "Model:        {}", studio.settings().model);
        let _ = write!(text, "Last error:   {}", studio.error().unwrap_or("none"));
        text
    }
}

fn describe(record: &GeneratedImage) -> String {
    format!(
        "Image {}\n  Prompt: \"{}\"\n  Canvas: {}\n  Created: {}\n  Save with `save {}`",
        record.id,
        record.prompt,
        record.settings.aspect_ratio,
        record.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
        record.id
    )
}
