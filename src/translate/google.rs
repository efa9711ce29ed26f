use async_trait::async_trait;
use reqwest::{Client, Request};
use serde_json::Value;
use tracing::debug;

use crate::config::TranslateConfig;
use crate::error::{Result, ParleyError};
use super::{Translator, common::{build_client, ensure_success}};

/// Longest text the web endpoint accepts per request
pub const GOOGLE_MAX_INPUT_CHARS: usize = 5000;

/// Translator backed by the public Google web translate endpoint
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(config: &TranslateConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// The text goes in the form body; only the language pair is in the URL
    fn build_request(
        &self,
        text: &str,
        target_language: &str,
        source_language: Option<&str>,
    ) -> Result<Request> {
        let url = format!("{}/translate_a/single", self.endpoint);
        let request = self
            .client
            .post(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", source_language.unwrap_or("auto")),
                ("tl", target_language),
                ("dt", "t"),
            ])
            .form(&[("q", text)])
            .build()?;
        Ok(request)
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
        source_language: Option<&str>,
    ) -> Result<String> {
        let request = self.build_request(text, target_language, source_language)?;

        debug!(
            "Sending translation request to: {} ({} -> {})",
            request.url().path(),
            source_language.unwrap_or("auto"),
            target_language
        );

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| ParleyError::TranslationUnavailable(format!("HTTP request failed: {}", e)))?;

        let response = ensure_success(response, "Google").await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| ParleyError::TranslationUnavailable(format!("Failed to parse response: {}", e)))?;

        parse_response(&body)
    }

    fn max_input_chars(&self) -> Option<usize> {
        Some(GOOGLE_MAX_INPUT_CHARS)
    }

    fn name(&self) -> &str {
        "google"
    }
}

/// Join the translated sentence pieces of a `translate_a/single` reply.
///
/// The reply is a nested array: `[[["Bonjour", "Hello", ...], ...], null, "en", ...]`.
fn parse_response(body: &Value) -> Result<String> {
    let sentences = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| ParleyError::TranslationUnavailable("Unexpected response shape".to_string()))?;

    let translated: String = sentences
        .iter()
        .filter_map(|entry| entry.get(0).and_then(Value::as_str))
        .collect();

    if let Some(detected) = body.get(2).and_then(Value::as_str) {
        debug!("Google detected source language: {}", detected);
    }

    if translated.is_empty() {
        return Err(ParleyError::TranslationUnavailable("Empty translation received".to_string()));
    }
    Ok(translated)
}
