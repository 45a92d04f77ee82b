use super::ImageExporter;
use crate::{data_uri, Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};

/// Writes images into a local output directory.
///
/// `data:` URIs are decoded in-process; `http(s)` URLs are downloaded.
pub struct FileExporter {
    client: Client,
    output_dir: PathBuf,
}

impl FileExporter {
    pub fn new(output_dir: &Path) -> Self {
        Self::new_with_client(output_dir, Client::new())
    }

    pub fn new_with_client(output_dir: &Path, client: Client) -> Self {
        Self {
            client,
            output_dir: output_dir.to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if data_uri::is_data_uri(url) {
            return Ok(data_uri::parse(url)?.bytes);
        }

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::InvalidInput(format!("Unsupported image URL: {}", url)));
        }

        tracing::debug!("Downloading image from {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Reject names that would escape the output directory.
fn sanitize_filename(filename: &str) -> Result<&str> {
    let name = filename.trim();
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(Error::InvalidInput(format!(
            "Invalid file name '{}'",
            filename
        )));
    }
    Ok(name)
}

#[async_trait]
impl ImageExporter for FileExporter {
    async fn save(&self, url: &str, filename: &str) -> Result<PathBuf> {
        let name = sanitize_filename(filename)?;
        let bytes = self.fetch(url).await?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(name);
        tokio::fs::write(&path, &bytes).await?;

        tracing::info!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}
