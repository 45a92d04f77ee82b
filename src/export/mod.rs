//! Saving generated images to disk
//!
//! The counterpart of a browser "save as": given a record's URL and a file
//! name, write the image bytes somewhere the user can find them.

pub mod file;
pub mod mock;

pub use file::FileExporter;
pub use mock::MockExporter;

use crate::Result;
use async_trait::async_trait;
use std::path::PathBuf;

#[async_trait]
pub trait ImageExporter: Send + Sync {
    /// Save the image behind `url` as `filename` and return where it went.
    async fn save(&self, url: &str, filename: &str) -> Result<PathBuf>;
}
