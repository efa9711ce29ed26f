use reqwest::{Client, Response};
use serde_json::json;
use std::time::Duration;
use tracing::info;

use crate::config::TranslateConfig;
use crate::error::{Result, ParleyError};

/// Build the HTTP client shared by a provider's calls
pub fn build_client(config: &TranslateConfig) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Turn a non-success HTTP response into `TranslationUnavailable`
pub async fn ensure_success(response: Response, provider: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    Err(ParleyError::TranslationUnavailable(format!(
        "{} API error {}: {}",
        provider, status, error_text
    )))
}

/// Check if Ollama is available and the model is loaded
pub async fn check_ollama_availability(endpoint: &str, model: &str) -> Result<()> {
    let client = Client::new();
    let url = format!("{}/api/show", endpoint.trim_end_matches('/'));

    let request = json!({
        "name": model
    });

    let response = client
        .post(&url)
        .json(&request)
        .send()
        .await
        .map_err(|e| ParleyError::TranslationUnavailable(format!("Failed to connect to Ollama: {}", e)))?;

    if response.status().is_success() {
        info!("Ollama model '{}' is available", model);
        Ok(())
    } else {
        Err(ParleyError::TranslationUnavailable(format!(
            "Ollama model '{}' not found. Please pull the model first: ollama pull {}",
            model, model
        )))
    }
}
