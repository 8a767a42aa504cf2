use thiserror::Error;

/// Errors returned by the enrichment client.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A configured base URL could not be parsed.
    #[error("invalid enrichment base URL: {0}")]
    InvalidBaseUrl(String),

    /// Any non-2xx response other than a summary 404 (which means "no page"
    /// and is not an error).
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// A response body did not match the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
