//! Data models and structures
//!
//! Defines generation settings, reference images, gallery records and the
//! environment-driven configuration.

use crate::ai::mime::detect_image_mime;
use crate::{presets, Error, Result};
use base64::Engine as _;
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const RECORD_ID_LEN: usize = 9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "4:3")]
    Classic,
    #[serde(rename = "9:16")]
    Mobile,
    #[serde(rename = "16:9")]
    Cinema,
}

impl AspectRatio {
    /// Display order used by the settings panel.
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Classic,
        AspectRatio::Portrait,
        AspectRatio::Cinema,
        AspectRatio::Mobile,
    ];

    /// Ratio label as sent to the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Classic => "4:3",
            AspectRatio::Mobile => "9:16",
            AspectRatio::Cinema => "16:9",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1 Square",
            AspectRatio::Portrait => "3:4 Portrait",
            AspectRatio::Classic => "4:3 Classic",
            AspectRatio::Mobile => "9:16 Mobile",
            AspectRatio::Cinema => "16:9 Cinema",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        AspectRatio::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == s)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "Unknown aspect ratio '{}'. Expected one of: 1:1, 4:3, 3:4, 16:9, 9:16",
                    s
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSize {
    #[default]
    #[serde(rename = "1K")]
    OneK,
}

/// Settings captured at the moment a generation is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    pub aspect_ratio: AspectRatio,
    pub image_size: ImageSize,
    pub model: String,
    /// Free-text suffix appended to the prompt.
    pub style: String,
}

impl GenerationSettings {
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::default(),
            image_size: ImageSize::default(),
            model: DEFAULT_IMAGE_MODEL.to_string(),
            style: presets::default_preset().prompt_suffix.to_string(),
        }
    }
}

/// User-supplied image sent ahead of the text part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceImage {
    /// Base64 payload, no data-URI header.
    pub data: String,
    pub mime_type: String,
}

impl ReferenceImage {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type: detect_image_mime(bytes).to_string(),
        }
    }

    /// Read a whole file into memory and encode it.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        tracing::debug!(
            "Loaded reference image {} ({} bytes)",
            path.display(),
            bytes.len()
        );
        Ok(Self::from_bytes(&bytes))
    }
}

/// Result of a single successful generation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutput {
    pub url: String,
    pub grounding_chunks: Vec<serde_json::Value>,
}

/// Gallery entry. Created only for successful generations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub id: String,
    pub url: String,
    pub prompt: String,
    pub timestamp: DateTime<Utc>,
    pub settings: GenerationSettings,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grounding_chunks: Vec<serde_json::Value>,
}

impl GeneratedImage {
    pub fn new(prompt: String, settings: GenerationSettings, output: GenerationOutput) -> Self {
        Self {
            id: new_record_id(),
            url: output.url,
            prompt,
            timestamp: Utc::now(),
            settings,
            grounding_chunks: output.grounding_chunks,
        }
    }

    /// File name offered when the record is downloaded.
    pub fn download_filename(&self) -> String {
        format!("creao-{}.png", self.id)
    }
}

fn new_record_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RECORD_ID_LEN)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub image_model: String,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }

        let gemini_api_key = resolve_api_key(
            std::env::var("GEMINI_API_KEY").ok(),
            std::env::var("API_KEY").ok(),
        )?;

        Ok(Self {
            gemini_api_key,
            gemini_base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            image_model: std::env::var("IMAGE_MODEL")
                .unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.to_string()),
            output_dir: std::env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("output")),
        })
    }
}

/// A blank key counts as unset, so a blank `GEMINI_API_KEY` still falls
/// back to `API_KEY`.
fn resolve_api_key(primary: Option<String>, fallback: Option<String>) -> Result<String> {
    let present = |key: &String| !key.trim().is_empty();
    primary
        .filter(present)
        .or_else(|| fallback.filter(present))
        .ok_or_else(|| Error::Config("GEMINI_API_KEY not set".to_string()))
}
