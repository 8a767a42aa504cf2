//! HTTP client for Reddit's public JSON search endpoint.
//!
//! No OAuth: the read-only `search.json` listing is enough for watching a
//! live thread. Responses are parsed into the shared [`Post`] type; children
//! that don't look like usable posts are skipped rather than failing the
//! whole listing.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;

use buzzmint_core::Post;

use crate::error::FeedError;
use crate::extract::post_from_data;
use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "https://www.reddit.com/";

/// Smallest batch worth analyzing.
pub const MIN_LIMIT: usize = 5;
/// Largest batch a single request will pull.
pub const MAX_LIMIT: usize = 50;
/// Batch size when the caller does not specify one.
pub const DEFAULT_LIMIT: usize = 25;

/// Wire shape of a Reddit listing response.
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: PostData,
}

/// One post's payload. Almost everything is optional; Reddit omits fields
/// freely depending on post kind.
#[derive(Debug, Deserialize)]
pub(crate) struct PostData {
    pub(crate) name: Option<String>,
    pub(crate) id: Option<String>,
    pub(crate) author: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) selftext: Option<String>,
    pub(crate) score: Option<i64>,
    pub(crate) created_utc: Option<f64>,
    pub(crate) permalink: Option<String>,
    pub(crate) url_overridden_by_dest: Option<String>,
    pub(crate) url: Option<String>,
    pub(crate) media_metadata: Option<HashMap<String, MediaMeta>>,
    pub(crate) gallery_data: Option<GalleryData>,
    pub(crate) preview: Option<Preview>,
    pub(crate) crosspost_parent_list: Option<Vec<PostData>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MediaMeta {
    pub(crate) status: Option<String>,
    pub(crate) s: Option<MediaSource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MediaSource {
    pub(crate) u: Option<String>,
    pub(crate) gif: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GalleryData {
    pub(crate) items: Vec<GalleryItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GalleryItem {
    pub(crate) media_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Preview {
    pub(crate) images: Vec<PreviewImage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PreviewImage {
    pub(crate) source: Option<ImageSource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageSource {
    pub(crate) url: Option<String>,
}

/// Client for the public Reddit search listing.
///
/// Use [`FeedClient::new`] for production or [`FeedClient::with_base_url`] to
/// point at a mock server in tests. Transient errors (429, 5xx, network) are
/// retried with exponential back-off up to `max_retries` additional attempts.
pub struct FeedClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl FeedClient {
    /// Creates a client pointed at reddit.com.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, FeedError> {
        Self::with_base_url(
            timeout_secs,
            user_agent,
            max_retries,
            backoff_base_ms,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`FeedError::InvalidBaseUrl`] if `base_url` is not
    /// a valid URL.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
        base_url: &str,
    ) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Ensure exactly one trailing slash so Url::join appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| FeedError::InvalidBaseUrl(format!("{normalised}: {e}")))?;

        Ok(Self {
            client,
            base_url,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Searches a subreddit for recent posts matching `query`.
    ///
    /// `limit` is clamped to `[MIN_LIMIT, MAX_LIMIT]`. Children that fail to
    /// convert (deleted, uncaptioned, malformed) are skipped silently.
    ///
    /// # Errors
    ///
    /// - [`FeedError::RateLimited`] on HTTP 429 after retries are exhausted.
    /// - [`FeedError::UnexpectedStatus`] on any other non-2xx response.
    /// - [`FeedError::Http`] on network failure.
    /// - [`FeedError::Deserialize`] if the body is not a listing.
    pub async fn fetch_posts(
        &self,
        subreddit: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Post>, FeedError> {
        let limit = limit.clamp(MIN_LIMIT, MAX_LIMIT);
        let subreddit = sanitize_subreddit(subreddit);
        let url = self.search_url(&subreddit, query, limit);

        let listing = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.fetch_listing(url.clone())
        })
        .await?;

        let posts: Vec<Post> = listing
            .data
            .children
            .into_iter()
            .filter_map(|child| post_from_data(child.data))
            .collect();

        tracing::debug!(
            subreddit = %subreddit,
            query = %query,
            count = posts.len(),
            "fetched feed posts"
        );

        Ok(posts)
    }

    fn search_url(&self, subreddit: &str, query: &str, limit: usize) -> Url {
        let mut url = self.base_url.clone();
        // base_url always ends in '/', so join never replaces a segment
        if let Ok(joined) = url.join(&format!("r/{subreddit}/search.json")) {
            url = joined;
        }
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            pairs.append_pair("restrict_sr", "1");
            pairs.append_pair("sort", "new");
            pairs.append_pair("limit", &limit.to_string());
            pairs.append_pair("raw_json", "1");
        }
        url
    }

    async fn fetch_listing(&self, url: Url) -> Result<Listing, FeedError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(10);
            return Err(FeedError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            return Err(FeedError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FeedError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}

/// Keep only characters Reddit allows in subreddit names. An empty result
/// falls back to `all`.
fn sanitize_subreddit(subreddit: &str) -> String {
    let cleaned: String = subreddit
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '+')
        .collect();
    if cleaned.is_empty() {
        "all".to_string()
    } else {
        cleaned
    }
}
