use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParleyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Translation unavailable: {0}")]
    TranslationUnavailable(String),

    #[error(
        "Placeholder mismatch after translation (missing: {missing:?}, duplicated: {duplicated:?}, unknown: {unknown:?})"
    )]
    UnmaskMismatch {
        missing: Vec<usize>,
        duplicated: Vec<usize>,
        unknown: Vec<String>,
    },

    #[error("Quality validation error: {0}")]
    Quality(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ParleyError>;
