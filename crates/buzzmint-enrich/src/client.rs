//! HTTP client for the Wikipedia search/summary and Wikidata entity APIs.
//!
//! Three endpoints per lookup, called in a short-circuit chain: full-text
//! search resolves the candidate to a page title, the REST summary fetches
//! the page card, and Wikidata's `Special:EntityData` checks the instance-of
//! (P31) claim for "human" (Q5). Candidates failing any gate resolve to
//! `Ok(None)`, not an error; errors are reserved for transport and protocol
//! failures.

use std::time::Duration;

use buzzmint_core::EntityProfile;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use crate::error::EnrichError;
use crate::verify::{description_suggests_person, titles_align};

const DEFAULT_WIKI_BASE: &str = "https://en.wikipedia.org/";
const DEFAULT_WIKIDATA_BASE: &str = "https://www.wikidata.org/";

/// Wikidata class for "human".
const HUMAN_CLASS: &str = "Q5";

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct PageSummary {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    thumbnail: Option<Thumbnail>,
    #[serde(default)]
    wikibase_item: Option<String>,
    #[serde(default)]
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    #[serde(default)]
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    #[serde(default)]
    desktop: Option<PageUrl>,
}

#[derive(Debug, Deserialize)]
struct PageUrl {
    #[serde(default)]
    page: Option<String>,
}

/// Client for person lookups.
///
/// Use [`EnrichClient::new`] for production or
/// [`EnrichClient::with_base_urls`] to point both APIs at mock servers in
/// tests.
pub struct EnrichClient {
    client: Client,
    search_endpoint: Url,
    summary_base: Url,
    entity_base: Url,
}

impl EnrichClient {
    /// Creates a client pointed at the production Wikipedia and Wikidata.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, EnrichError> {
        Self::with_base_urls(timeout_secs, user_agent, DEFAULT_WIKI_BASE, DEFAULT_WIKIDATA_BASE)
    }

    /// Creates a client with custom base URLs (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`EnrichError::InvalidBaseUrl`] if either
    /// base does not parse.
    pub fn with_base_urls(
        timeout_secs: u64,
        user_agent: &str,
        wiki_base: &str,
        wikidata_base: &str,
    ) -> Result<Self, EnrichError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let wiki = parse_base(wiki_base)?;
        let wikidata = parse_base(wikidata_base)?;

        Ok(Self {
            client,
            search_endpoint: join_base(&wiki, "w/api.php")?,
            summary_base: join_base(&wiki, "api/rest_v1/page/summary/")?,
            entity_base: join_base(&wikidata, "wiki/Special:EntityData/")?,
        })
    }

    /// Resolve a name candidate to a verified person profile.
    ///
    /// Returns `Ok(None)` whenever the candidate fails a gate: no search hit,
    /// a hit whose title shares no word with the candidate, a vanished page,
    /// or a subject that is neither instance-of-human on Wikidata nor
    /// described with a person occupation. A Wikidata outage downgrades to
    /// the description check rather than failing the lookup.
    ///
    /// # Errors
    ///
    /// - [`EnrichError::Http`] on network failure.
    /// - [`EnrichError::UnexpectedStatus`] on a non-2xx search or summary
    ///   response (summary 404 excepted).
    /// - [`EnrichError::Deserialize`] if a body does not match the expected
    ///   shape.
    pub async fn lookup_person(&self, name: &str) -> Result<Option<EntityProfile>, EnrichError> {
        let Some(title) = self.search_title(name).await? else {
            debug!(%name, "no search hit");
            return Ok(None);
        };

        if !titles_align(name, &title) {
            debug!(%name, %title, "search hit shares no words with candidate; discarding");
            return Ok(None);
        }

        let Some(summary) = self.page_summary(&title).await? else {
            debug!(%name, %title, "summary page missing");
            return Ok(None);
        };

        let verified_human = match summary.wikibase_item.as_deref() {
            Some(qid) => match self.is_instance_of_human(qid).await {
                Ok(flag) => flag,
                Err(error) => {
                    debug!(%name, qid, %error, "instance-of check failed; using description fallback");
                    false
                }
            },
            None => false,
        };

        if !verified_human && !description_suggests_person(summary.description.as_deref()) {
            debug!(%name, %title, "subject is not a person; discarding");
            return Ok(None);
        }

        Ok(Some(EntityProfile {
            name: name.to_string(),
            title,
            description: summary.description,
            summary: summary.extract,
            thumbnail_url: summary.thumbnail.and_then(|t| t.source),
            source_url: summary.content_urls.and_then(|c| c.desktop).and_then(|d| d.page),
            mentions: 0,
        }))
    }

    /// Top full-text search hit for the candidate, if any.
    async fn search_title(&self, name: &str) -> Result<Option<String>, EnrichError> {
        let mut url = self.search_endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("action", "query");
            pairs.append_pair("list", "search");
            pairs.append_pair("srsearch", name);
            pairs.append_pair("srlimit", "1");
            pairs.append_pair("format", "json");
        }

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let envelope: SearchEnvelope =
            serde_json::from_str(&body).map_err(|e| EnrichError::Deserialize {
                context: format!("search({name})"),
                source: e,
            })?;

        Ok(envelope
            .query
            .and_then(|q| q.search.into_iter().next())
            .map(|hit| hit.title))
    }

    /// REST summary card for a page title. 404 means the page does not exist
    /// and maps to `Ok(None)`.
    async fn page_summary(&self, title: &str) -> Result<Option<PageSummary>, EnrichError> {
        let encoded = utf8_percent_encode(title, NON_ALPHANUMERIC).to_string();
        let url = join_base(&self.summary_base, &encoded)?;

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(EnrichError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let summary: PageSummary =
            serde_json::from_str(&body).map_err(|e| EnrichError::Deserialize {
                context: format!("summary({title})"),
                source: e,
            })?;
        Ok(Some(summary))
    }

    /// Whether the Wikidata item carries an instance-of (P31) claim for
    /// human (Q5).
    async fn is_instance_of_human(&self, qid: &str) -> Result<bool, EnrichError> {
        let url = join_base(&self.entity_base, &format!("{qid}.json"))?;

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| EnrichError::Deserialize {
                context: format!("entity({qid})"),
                source: e,
            })?;

        let is_human = value
            .pointer(&format!("/entities/{qid}/claims/P31"))
            .and_then(serde_json::Value::as_array)
            .is_some_and(|claims| {
                claims.iter().any(|claim| {
                    claim
                        .pointer("/mainsnak/datavalue/value/id")
                        .and_then(serde_json::Value::as_str)
                        == Some(HUMAN_CLASS)
                })
            });
        Ok(is_human)
    }
}

/// Normalise to exactly one trailing slash so joins append rather than
/// replace the last path segment.
fn parse_base(base: &str) -> Result<Url, EnrichError> {
    let normalised = format!("{}/", base.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| EnrichError::InvalidBaseUrl(format!("{normalised}: {e}")))
}

fn join_base(base: &Url, segment: &str) -> Result<Url, EnrichError> {
    base.join(segment)
        .map_err(|e| EnrichError::InvalidBaseUrl(format!("{base}{segment}: {e}")))
}
