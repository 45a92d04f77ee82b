pub mod client;
pub mod image;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::GeminiHttpClient;
pub use image::{GeminiImageClient, ResponsePayload};
