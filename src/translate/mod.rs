// Translation providers
//
// The pipeline only needs a `translate(text, target, source)` capability. Each
// provider implements it against one backend and is picked by the factory:
// - Google: public web translate endpoint
// - Ollama: local LLM with a JSON-format prompt
// - Identity: returns the input unchanged

pub mod common;
pub mod google;
pub mod identity;
pub mod ollama;

use async_trait::async_trait;

pub use common::check_ollama_availability;
use crate::config::{Provider, TranslateConfig};
use crate::error::Result;

/// External translation capability
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_language`; `None` source means auto-detect
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
        source_language: Option<&str>,
    ) -> Result<String>;

    /// Longest input, in characters, accepted in one call
    fn max_input_chars(&self) -> Option<usize> {
        None
    }

    /// Short provider name for logs
    fn name(&self) -> &str;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create a translator for the configured provider
    pub fn create_translator(config: &TranslateConfig) -> Result<Box<dyn Translator>> {
        let translator: Box<dyn Translator> = match config.provider {
            Provider::Google => Box::new(google::GoogleTranslator::new(config)?),
            Provider::Ollama => Box::new(ollama::OllamaTranslator::new(config)?),
            Provider::Identity => Box::new(identity::IdentityTranslator),
        };
        Ok(translator)
    }
}
