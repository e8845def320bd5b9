use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuditError>;

#[derive(Debug, Error)]
pub enum AuditError {
    /// The seed URL has no determinable host
    #[error("Cannot determine host for URL: {0:?}")]
    InvalidUrl(String),

    /// Network, timeout or body-decode failure for a single request
    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Malformed structured data: {0}")]
    MalformedStructuredData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuditError {
    pub fn fetch(url: &str, err: impl std::fmt::Display) -> Self {
        AuditError::Fetch {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

impl From<regex::Error> for AuditError {
    fn from(err: regex::Error) -> Self {
        AuditError::Config(err.to_string())
    }
}
