use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{Result, ParleyError};

// Default values for optional configuration fields
fn default_timeout_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_tag_vocabulary() -> Vec<String> {
    ["p", "br", "b", "i", "u", "s", "em", "strong", "code", "span"]
        .iter()
        .map(|t| t.to_string())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub translate: TranslateConfig,
    #[serde(default)]
    pub protect: ProtectConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Translation provider
    pub provider: Provider,
    /// Provider endpoint URL
    pub endpoint: String,
    /// Model name (Ollama only)
    pub model: String,
    /// HTTP timeout per translation call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum characters sent per call; the provider's own limit still applies
    #[serde(default)]
    pub max_chunk_chars: Option<usize>,
    /// Translate chunks concurrently instead of one after another
    #[serde(default)]
    pub parallel_chunks: bool,
    /// Detect the source language when the caller does not give one
    #[serde(default = "default_true")]
    pub detect_source: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provider {
    /// Google web translate endpoint
    Google,
    /// Local LLM served by Ollama
    Ollama,
    /// Returns text unchanged; useful for dry runs
    Identity,
}

impl std::str::FromStr for Provider {
    type Err = ParleyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Provider::Google),
            "ollama" => Ok(Provider::Ollama),
            "identity" | "none" => Ok(Provider::Identity),
            other => Err(ParleyError::Config(format!("Unknown provider: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectConfig {
    /// Protect `scheme://...` links
    #[serde(default = "default_true")]
    pub links: bool,
    /// Protect emoji graphemes
    #[serde(default = "default_true")]
    pub emojis: bool,
    /// Protect inline markup tags from `tag_vocabulary`
    #[serde(default = "default_true")]
    pub markup_tags: bool,
    /// Tag names treated as protected markup
    #[serde(default = "default_tag_vocabulary")]
    pub tag_vocabulary: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Prefix successful translations with a `[src → dst]` line
    #[serde(default)]
    pub language_pair_line: bool,
    /// Appended after a blank line when translation fails
    #[serde(default)]
    pub failure_notice: Option<String>,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Google,
            endpoint: "https://translate.googleapis.com".to_string(),
            model: "llama3.2:3b".to_string(),
            timeout_secs: default_timeout_secs(),
            max_chunk_chars: None,
            parallel_chunks: false,
            detect_source: true,
        }
    }
}

impl Default for ProtectConfig {
    fn default() -> Self {
        Self {
            links: true,
            emojis: true,
            markup_tags: true,
            tag_vocabulary: default_tag_vocabulary(),
        }
    }
}

impl TranslateConfig {
    /// Endpoint used when switching provider from the command line
    pub fn default_endpoint(provider: Provider) -> &'static str {
        match provider {
            Provider::Google => "https://translate.googleapis.com",
            Provider::Ollama => "http://localhost:11434",
            Provider::Identity => "",
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ParleyError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ParleyError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
