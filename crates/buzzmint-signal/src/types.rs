//! Aggregated output of one trend pass.

use buzzmint_core::{EntityProfile, Moment, Post, SentimentScore, Vibe};
use serde::{Deserialize, Serialize};

/// Everything one pass over the live feed produced, bundled for the API and
/// the composer.
///
/// Always well-formed: a failed fetch or an empty subreddit produces a
/// summary with empty collections and a neutral vibe, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendSummary {
    pub subreddit: String,
    pub query: String,
    pub post_count: usize,
    pub posts: Vec<Post>,
    pub scores: Vec<SentimentScore>,
    pub mean_polarity: f32,
    pub vibe: Vibe,
    pub keywords: Vec<String>,
    /// Detected moments, strongest first.
    pub moments: Vec<Moment>,
    /// Convenience copy of `moments[0]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_moment: Option<Moment>,
    /// Most-mentioned verified person, if any candidate survived enrichment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_entity: Option<EntityProfile>,
}

impl TrendSummary {
    /// Summary for a batch that produced no posts at all.
    #[must_use]
    pub fn empty(subreddit: &str, query: &str) -> Self {
        Self {
            subreddit: subreddit.to_string(),
            query: query.to_string(),
            post_count: 0,
            posts: Vec::new(),
            scores: Vec::new(),
            mean_polarity: 0.0,
            vibe: Vibe::Neutral,
            keywords: Vec::new(),
            moments: Vec::new(),
            top_moment: None,
            top_entity: None,
        }
    }
}
