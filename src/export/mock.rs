use super::ImageExporter;
use crate::{data_uri, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Keeps "saved" files in memory. Remote URLs are stored as their UTF-8
/// text since nothing is fetched.
#[derive(Clone)]
pub struct MockExporter {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    base_path: PathBuf,
    save_count: Arc<Mutex<usize>>,
}

impl MockExporter {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            base_path: PathBuf::from("/mock/output"),
            save_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn get_save_count(&self) -> usize {
        *self.save_count.lock().unwrap()
    }

    pub fn get_files(&self) -> HashMap<String, Vec<u8>> {
        self.files.lock().unwrap().clone()
    }
}

impl Default for MockExporter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageExporter for MockExporter {
    async fn save(&self, url: &str, filename: &str) -> Result<PathBuf> {
        *self.save_count.lock().unwrap() += 1;

        let bytes = if data_uri::is_data_uri(url) {
            data_uri::parse(url)?.bytes
        } else {
            url.as_bytes().to_vec()
        };

        self.files
            .lock()
            .unwrap()
            .insert(filename.to_string(), bytes);
        Ok(self.base_path.join(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_exporter_stores_decoded_bytes() {
        let exporter = MockExporter::new().with_base_path("/tmp/studio");

        let path = exporter
            .save("data:image/png;base64,iVBORw==", "a.png")
            .await
            .unwrap();

        assert_eq!(path, PathBuf::from("/tmp/studio/a.png"));
        assert_eq!(exporter.get_save_count(), 1);
        assert_eq!(
            exporter.get_files().get("a.png"),
            Some(&vec![0x89, 0x50, 0x4E, 0x47])
        );
    }

    #[tokio::test]
    async fn test_mock_exporter_rejects_bad_data_uri() {
        let exporter = MockExporter::new();
        let result = exporter.save("data:image/png;base64,!!!", "a.png").await;
        tokio_test::assert_err!(result);
        assert!(exporter.get_files().is_empty());
    }
}
