//! Terminal image studio backed by Gemini image generation
//!
//! A prompt (and optionally a reference image) goes to the hosted model; the
//! returned image lands in an in-memory, newest-first gallery that lives as
//! long as the session.

pub mod ai;
pub mod app;
pub mod command;
pub mod data_uri;
pub mod error;
pub mod export;
pub mod models;
pub mod presets;
pub mod session;

pub use error::{Error, Result};
