use thiserror::Error;

/// Construction-time failures. Runtime publish failures are reported through
/// [`PublishOutcome`](crate::PublishOutcome) instead, since a failed publish
/// is an expected outcome rather than an error to propagate.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publish HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid publish base URL: {0}")]
    InvalidBaseUrl(String),
}
