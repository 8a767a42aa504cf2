//! Trend aggregation: one pass from live posts to a [`TrendSummary`].
//!
//! The aggregator talks to its collaborators through the [`PostSource`] and
//! [`ProfileLookup`] traits so tests can substitute fixtures for the real
//! HTTP clients. Every collaborator failure degrades the summary instead of
//! surfacing: a dead feed yields an empty summary, a dead encyclopedia just
//! loses the entity.

use std::future::Future;
use std::time::Duration;

use buzzmint_core::{EntityProfile, MomentTable, Post, Stoplist, Vibe};
use buzzmint_enrich::EnrichClient;
use buzzmint_feed::FeedClient;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::classify::classify;
use crate::entities::rank_candidates;
use crate::keywords::{extract_keywords, DEFAULT_KEYWORD_LIMIT};
use crate::scorer::{mean_polarity, score_posts};
use crate::types::TrendSummary;

/// Boxed error for trait-object-free seams; the aggregator only ever logs it.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Where posts come from.
pub trait PostSource: Send + Sync {
    fn fetch_posts(
        &self,
        subreddit: &str,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Post>, BoxError>> + Send;
}

/// Resolves a name candidate to a verified person profile.
pub trait ProfileLookup: Send + Sync {
    fn lookup_person(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<EntityProfile>, BoxError>> + Send;
}

impl PostSource for FeedClient {
    fn fetch_posts(
        &self,
        subreddit: &str,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Post>, BoxError>> + Send {
        async move {
            FeedClient::fetch_posts(self, subreddit, query, limit)
                .await
                .map_err(Into::into)
        }
    }
}

impl ProfileLookup for EnrichClient {
    fn lookup_person(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<EntityProfile>, BoxError>> + Send {
        async move {
            EnrichClient::lookup_person(self, name)
                .await
                .map_err(Into::into)
        }
    }
}

/// Tuning knobs for the enrichment fan-out.
#[derive(Debug, Clone)]
pub struct AggregatorOptions {
    /// How many name candidates are worth a lookup, best-ranked first.
    pub candidate_limit: usize,
    /// Concurrent lookups in flight.
    pub concurrency: usize,
    /// Per-lookup deadline; a slow encyclopedia must not stall the trend call.
    pub lookup_timeout: Duration,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            candidate_limit: 8,
            concurrency: 4,
            lookup_timeout: Duration::from_secs(3),
        }
    }
}

/// Orchestrates fetch, scoring, classification, keyword extraction, and
/// entity enrichment into a single infallible call.
pub struct TrendAggregator<S, L> {
    source: S,
    lookup: L,
    table: MomentTable,
    stoplist: Stoplist,
    options: AggregatorOptions,
}

impl<S: PostSource, L: ProfileLookup> TrendAggregator<S, L> {
    pub fn new(source: S, lookup: L, table: MomentTable, stoplist: Stoplist) -> Self {
        Self {
            source,
            lookup,
            table,
            stoplist,
            options: AggregatorOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: AggregatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Run one full pass. Never fails: collaborator errors are logged and the
    /// summary degrades (empty posts, missing entity) instead.
    pub async fn aggregate(&self, subreddit: &str, query: &str, limit: usize) -> TrendSummary {
        let posts = match self.source.fetch_posts(subreddit, query, limit).await {
            Ok(posts) => posts,
            Err(error) => {
                warn!(%subreddit, %query, %error, "post fetch failed; returning empty summary");
                return TrendSummary::empty(subreddit, query);
            }
        };
        if posts.is_empty() {
            debug!(%subreddit, %query, "feed returned no posts");
            return TrendSummary::empty(subreddit, query);
        }

        let scores = score_posts(&posts);
        let mean = mean_polarity(&scores);
        let vibe = Vibe::from_mean_polarity(mean);
        let keywords = extract_keywords(&posts, &scores, vibe, DEFAULT_KEYWORD_LIMIT);
        let moments = classify(&posts, &scores, &self.table);
        let top_moment = moments.first().cloned();

        let candidates = rank_candidates(&posts, &self.stoplist);
        let top_entity = self.resolve_top_entity(&candidates).await;

        debug!(
            %subreddit,
            %query,
            post_count = posts.len(),
            moment_count = moments.len(),
            %vibe,
            entity = top_entity.as_ref().map_or("none", |e| e.title.as_str()),
            "trend pass complete"
        );

        TrendSummary {
            subreddit: subreddit.to_string(),
            query: query.to_string(),
            post_count: posts.len(),
            posts,
            scores,
            mean_polarity: mean,
            vibe,
            keywords,
            moments,
            top_moment,
            top_entity,
        }
    }

    /// Look up the shortlisted candidates concurrently and keep the
    /// best-ranked one that verified as a person.
    ///
    /// Lookups run with `buffer_unordered`, so completion order is racy; the
    /// winner is picked by candidate rank afterwards, which keeps the result
    /// deterministic for a fixed set of lookup outcomes.
    async fn resolve_top_entity(&self, candidates: &[(String, usize)]) -> Option<EntityProfile> {
        let shortlist: Vec<(usize, String, usize)> = candidates
            .iter()
            .take(self.options.candidate_limit)
            .enumerate()
            .map(|(rank, (name, mentions))| (rank, name.clone(), *mentions))
            .collect();
        if shortlist.is_empty() {
            return None;
        }

        let lookup = &self.lookup;
        let deadline = self.options.lookup_timeout;
        let resolved: Vec<(usize, EntityProfile)> = stream::iter(shortlist)
            .map(|(rank, name, mentions)| async move {
                let outcome = tokio::time::timeout(deadline, lookup.lookup_person(&name)).await;
                let profile = match outcome {
                    Ok(Ok(Some(mut profile))) => {
                        profile.mentions = mentions;
                        Some(profile)
                    }
                    Ok(Ok(None)) => None,
                    Ok(Err(error)) => {
                        warn!(%name, %error, "entity lookup failed; skipping candidate");
                        None
                    }
                    Err(_) => {
                        warn!(%name, ?deadline, "entity lookup timed out");
                        None
                    }
                };
                (rank, profile)
            })
            .buffer_unordered(self.options.concurrency.max(1))
            .filter_map(|(rank, profile)| async move { profile.map(|p| (rank, p)) })
            .collect()
            .await;

        resolved
            .into_iter()
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, profile)| profile)
    }
}
