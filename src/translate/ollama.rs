use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TranslateConfig;
use crate::detect::language_name;
use crate::error::{Result, ParleyError};
use super::{Translator, common::{build_client, ensure_success}};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TranslatedText {
    text: String,
}

/// Translator backed by a local Ollama model
pub struct OllamaTranslator {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaTranslator {
    pub fn new(config: &TranslateConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// Build translation prompt, using JSON format
    fn build_prompt(&self, text: &str, target_language: &str, source_language: Option<&str>) -> String {
        let target_name = language_name(target_language);
        let source_line = match source_language {
            Some(code) => format!("The source language is: {} (language code: {})\n", language_name(code), code),
            None => String::new(),
        };

        format!(
            "You are a professional translator of chat messages.\n\
             \n\
             CRITICAL: You must translate the text to {} ONLY. Do not translate to any other language.\n\
             The target language is: {} (language code: {})\n\
             {}\
             \n\
             The text contains placeholder tokens such as <<PH_0>>. Copy every placeholder token\n\
             exactly as written, once each, and keep it where it belongs in the sentence.\n\
             \n\
             Return ONLY the translation in JSON format as {{\"text\":\"your {} translation here\"}}.\n\
             Do not include any explanations, alternatives, or text in other languages.\n\
             \n\
             [Text to translate]\n\
             {}\n",
            target_name, target_name, target_language, source_line, target_name, text
        )
    }
}

#[async_trait]
impl Translator for OllamaTranslator {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
        source_language: Option<&str>,
    ) -> Result<String> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: self.build_prompt(text, target_language, source_language),
            stream: false,
            format: "json".to_string(),
        };

        let url = format!("{}/api/generate", self.endpoint);

        debug!("Sending translation request to: {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ParleyError::TranslationUnavailable(format!("HTTP request failed: {}", e)))?;

        let response = ensure_success(response, "Ollama").await?;
        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ParleyError::TranslationUnavailable(format!("Failed to parse response: {}", e)))?;

        parse_generated(&generated.response)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Extract the translation from the model output
fn parse_generated(raw: &str) -> Result<String> {
    let raw = raw.trim();

    debug!("Raw Ollama response: {}", raw);

    if raw.is_empty() {
        return Err(ParleyError::TranslationUnavailable("Empty translation received".to_string()));
    }

    if let Ok(result) = serde_json::from_str::<TranslatedText>(raw) {
        return Ok(result.text.trim().to_string());
    }

    Ok(clean_translation_response(raw))
}

/// Clean up free-text output to extract just the translation
fn clean_translation_response(response: &str) -> String {
    let lines: Vec<&str> = response.lines().collect();

    for &line in &lines {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with("Here is")
            || trimmed.starts_with("Here are")
            || trimmed.starts_with("Translation:")
            || trimmed.starts_with("```")
        {
            continue;
        }

        if trimmed.starts_with("**") && trimmed.ends_with("**") {
            continue;
        }

        return trimmed.to_string();
    }

    response.trim().to_string()
}
