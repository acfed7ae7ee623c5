// src/errors.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Failed to parse TOML catalog: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Pricing catalog unavailable: {0}")]
    Catalog(String),

    #[error("Unexpected response structure: {0}")]
    UnexpectedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Webhook rejected submission with status {status}: {body}")]
    Webhook { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, AppError>;
