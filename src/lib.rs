//! Parley - Chat message translation with protected spans
//!
//! Links, emojis and inline markup tags are swapped for placeholder tokens before
//! a message is handed to an external translator, then restored afterwards so the
//! translator cannot mangle them.

pub mod chunk;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod pipeline;
pub mod placeholder;
pub mod protect;
pub mod quality;
pub mod translate;

pub use pipeline::{PlaceholderTranslationPipeline, TranslationResult};
