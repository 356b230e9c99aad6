//! Error types for toolchat

use thiserror::Error;

/// Result type alias using toolchat's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for toolchat
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Chat-completion API error
    #[error("LLM API error: {0}")]
    Llm(String),

    /// Upstream tool provider error (search, page fetch)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Prompt template error
    #[error("Template error: {0}")]
    Template(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unauthorized access
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Timeout error
    #[error("Timeout: {0}")]
    Timeout(String),
}

impl Error {
    /// Check if error is transient (network hiccups, throttling)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Http(_)
                | Error::Llm(_)
                | Error::Provider(_)
                | Error::RateLimit(_)
                | Error::Timeout(_)
        )
    }
}

impl From<handlebars::TemplateError> for Error {
    fn from(err: handlebars::TemplateError) -> Self {
        Error::Template(err.to_string())
    }
}

impl From<handlebars::RenderError> for Error {
    fn from(err: handlebars::RenderError) -> Self {
        Error::Template(err.to_string())
    }
}
