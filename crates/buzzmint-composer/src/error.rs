use thiserror::Error;

/// Errors returned by the meme composer.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The spec failed validation before any rendering started.
    #[error("invalid meme spec: {0}")]
    InvalidSpec(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// PNG encoding failed. Out-of-memory aside, this does not happen for
    /// canvases the spec validator lets through.
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}
