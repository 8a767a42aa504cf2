//! Signal extraction over a batch of live posts.
//!
//! Everything in this crate is a pure function of the batch except the
//! [`TrendAggregator`], which drives the feed and person-enrichment clients
//! through injected traits and folds their failures into a degraded (never
//! failing) [`TrendSummary`].

pub mod aggregate;
pub mod classify;
pub mod entities;
pub mod keywords;
pub mod scorer;
pub mod types;

pub use aggregate::{
    AggregatorOptions, BoxError, PostSource, ProfileLookup, TrendAggregator,
};
pub use classify::classify;
pub use entities::{extract_names, rank_candidates};
pub use keywords::{extract_keywords, DEFAULT_KEYWORD_LIMIT};
pub use scorer::{mean_polarity, score_post, score_posts, score_text};
pub use types::TrendSummary;
