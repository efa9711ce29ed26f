use async_trait::async_trait;

use crate::error::Result;
use super::Translator;

/// Returns every input unchanged
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityTranslator;

#[async_trait]
impl Translator for IdentityTranslator {
    async fn translate(
        &self,
        text: &str,
        _target_language: &str,
        _source_language: Option<&str>,
    ) -> Result<String> {
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "identity"
    }
}
