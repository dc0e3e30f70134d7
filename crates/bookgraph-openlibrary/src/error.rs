use bookgraph_core::LookupError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error from {0}: {1}")]
    ApiError(String, String),

    #[error("rate limit from {0}, retry after {1}s")]
    RateLimit(String, u64),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, SourceError>;

impl SourceError {
    pub fn into_lookup(self, source_name: &str) -> LookupError {
        match self {
            Self::NotFound(what) => LookupError::NotFound(what),
            other => LookupError::failure(source_name, other.to_string()),
        }
    }
}
