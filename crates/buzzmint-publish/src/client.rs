//! X (Twitter) publishing: upload the PNG, then create the post.
//!
//! Publishing is strictly best-effort. A missing token, a rejected upload,
//! or a failed post creation all come back as a [`PublishOutcome`] variant;
//! nothing here can fail the pipeline that produced the meme.

use std::fmt;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::PublishError;

const DEFAULT_UPLOAD_BASE: &str = "https://upload.twitter.com/";
const DEFAULT_API_BASE: &str = "https://api.x.com/";

/// Environment variable holding the bearer token for publishing.
pub const TOKEN_ENV_VAR: &str = "BUZZMINT_X_BEARER_TOKEN";

/// How much response body to quote back in a failure reason.
const REASON_SNIPPET_CHARS: usize = 200;

/// Result of one publish attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// The post went out; `post_id` identifies it on the platform.
    Posted { post_id: String },
    /// No credentials were supplied; nothing was attempted.
    NotConfigured { required_env: Vec<String> },
    /// The platform rejected the upload or the post.
    Failed { reason: String },
}

/// Client for the two-step media upload + post creation flow.
#[derive(Clone)]
pub struct PublishClient {
    client: reqwest::Client,
    bearer_token: Option<String>,
    upload_base: Url,
    api_base: Url,
}

impl fmt::Debug for PublishClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishClient")
            .field("configured", &self.bearer_token.is_some())
            .field("upload_base", &self.upload_base.as_str())
            .field("api_base", &self.api_base.as_str())
            .finish_non_exhaustive()
    }
}

impl PublishClient {
    /// Build a client against the production endpoints. A `None`, empty, or
    /// whitespace token produces an unconfigured client whose publishes
    /// short-circuit to [`PublishOutcome::NotConfigured`].
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Http`] when the HTTP client cannot be built.
    pub fn new(bearer_token: Option<String>, timeout_secs: u64) -> Result<Self, PublishError> {
        Self::with_base_urls(bearer_token, timeout_secs, DEFAULT_UPLOAD_BASE, DEFAULT_API_BASE)
    }

    /// Build a client against explicit endpoints, for tests and proxies.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::InvalidBaseUrl`] when either base does not
    /// parse, or [`PublishError::Http`] when the HTTP client cannot be
    /// built.
    pub fn with_base_urls(
        bearer_token: Option<String>,
        timeout_secs: u64,
        upload_base: &str,
        api_base: &str,
    ) -> Result<Self, PublishError> {
        let bearer_token = bearer_token.and_then(|token| {
            let token = token.trim().to_string();
            if token.is_empty() {
                None
            } else {
                Some(token)
            }
        });
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            bearer_token,
            upload_base: parse_base(upload_base)?,
            api_base: parse_base(api_base)?,
        })
    }

    /// Whether a bearer token is present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.bearer_token.is_some()
    }

    /// Publish one PNG with a caption. Infallible by contract; inspect the
    /// returned [`PublishOutcome`] for what happened.
    pub async fn post_image(&self, png: &[u8], caption: &str) -> PublishOutcome {
        let Some(token) = self.bearer_token.as_deref() else {
            return PublishOutcome::NotConfigured {
                required_env: vec![TOKEN_ENV_VAR.to_string()],
            };
        };

        let media_id = match self.upload_media(token, png).await {
            Ok(media_id) => media_id,
            Err(reason) => {
                warn!(%reason, "media upload failed");
                return PublishOutcome::Failed { reason };
            }
        };

        match self.create_post(token, caption, &media_id).await {
            Ok(post_id) => {
                info!(%post_id, "published meme");
                PublishOutcome::Posted { post_id }
            }
            Err(reason) => {
                warn!(%reason, "post creation failed");
                PublishOutcome::Failed { reason }
            }
        }
    }

    async fn upload_media(&self, token: &str, png: &[u8]) -> Result<String, String> {
        let url = self
            .upload_base
            .join("1.1/media/upload.json")
            .map_err(|error| format!("media upload URL: {error}"))?;
        let part = Part::bytes(png.to_vec())
            .file_name("meme.png")
            .mime_str("image/png")
            .map_err(|error| format!("media part: {error}"))?;
        let form = Form::new().part("media", part);

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(|error| format!("media upload request: {error}"))?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(api_failure("media upload", status, &body));
        }

        let parsed: MediaUploadResponse = serde_json::from_str(&body)
            .map_err(|error| format!("media upload response not JSON: {error}"))?;
        parsed
            .media_id_string
            .ok_or_else(|| "media upload response missing media_id_string".to_string())
    }

    async fn create_post(
        &self,
        token: &str,
        caption: &str,
        media_id: &str,
    ) -> Result<String, String> {
        let url = self
            .api_base
            .join("2/tweets")
            .map_err(|error| format!("post URL: {error}"))?;
        let payload = serde_json::json!({
            "text": caption,
            "media": { "media_ids": [media_id] },
        });

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .map_err(|error| format!("post request: {error}"))?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(api_failure("post creation", status, &body));
        }

        let parsed: PostResponse = serde_json::from_str(&body)
            .map_err(|error| format!("post response not JSON: {error}"))?;
        parsed
            .data
            .map(|data| data.id)
            .ok_or_else(|| "post response missing data.id".to_string())
    }
}

fn parse_base(raw: &str) -> Result<Url, PublishError> {
    let normalised = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalised)
        .map_err(|error| PublishError::InvalidBaseUrl(format!("{normalised}: {error}")))
}

fn api_failure(context: &str, status: StatusCode, body: &str) -> String {
    let snippet: String = body.chars().take(REASON_SNIPPET_CHARS).collect();
    format!("{context} returned {status}: {snippet}")
}

#[derive(Debug, Deserialize)]
struct MediaUploadResponse {
    media_id_string: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostResponse {
    data: Option<PostData>,
}

#[derive(Debug, Deserialize)]
struct PostData {
    id: String,
}
