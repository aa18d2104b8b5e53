use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuoteError {
    /// A price source could not be reached or returned something unusable.
    #[error("Upstream fetch from {source_name} failed: {message}")]
    UpstreamFetch {
        source_name: &'static str,
        message: String,
    },

    #[error("Unsupported asset: {0}")]
    UnsupportedAsset(String),

    /// Raised by request handling, never by the fetchers.
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

impl QuoteError {
    pub fn upstream(source_name: &'static str, message: impl Into<String>) -> Self {
        QuoteError::UpstreamFetch {
            source_name,
            message: message.into(),
        }
    }
}

pub type Result<T, E = QuoteError> = std::result::Result<T, E>;
