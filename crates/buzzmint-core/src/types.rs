use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single social post pulled from the live feed.
///
/// Immutable once fetched; everything downstream (scores, moments, images)
/// is derived from it within a single request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Source-assigned post id (e.g. a Reddit fullname like `t3_abc123`).
    pub id: String,
    pub author: Option<String>,
    pub title: String,
    /// Self-text body; empty for link posts.
    #[serde(default)]
    pub body: String,
    /// Popularity proxy (upvotes minus downvotes on Reddit).
    pub score: i64,
    pub created_utc: Option<DateTime<Utc>>,
    pub url: Option<String>,
    /// Direct image URLs extracted from the post payload, best first.
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl Post {
    /// Title and body joined for analysis. Title-only posts return the title.
    #[must_use]
    pub fn text(&self) -> String {
        let body = self.body.trim();
        if body.is_empty() {
            self.title.trim().to_string()
        } else {
            format!("{} {}", self.title.trim(), body)
        }
    }

    /// The best image candidate for this post, if any was extracted.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.image_urls.first().map(String::as_str)
    }
}

/// Sentiment of one post's text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub post_id: String,
    /// Direction in `[-1.0, 1.0]`: negative is hostile, positive is excited.
    pub polarity: f32,
    /// Strength in `[0.0, 1.0]`, independent of direction.
    pub magnitude: f32,
}

impl SentimentScore {
    #[must_use]
    pub fn neutral(post_id: &str) -> Self {
        Self {
            post_id: post_id.to_string(),
            polarity: 0.0,
            magnitude: 0.0,
        }
    }
}

/// A detected in-game moment: a keyword-table label plus the evidence for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Moment {
    pub label: String,
    /// Ids of the posts that matched, deduplicated and sorted.
    pub matched_posts: Vec<String>,
    /// Normalized strength in `[0.0, 1.0]`.
    pub confidence: f32,
    /// Mean polarity across the matched posts, `[-1.0, 1.0]`.
    pub aggregate_sentiment: f32,
}

/// Biographical profile for a person detected in the feed.
///
/// Every field beyond `name` is best-effort; absence is a normal state, not
/// a failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityProfile {
    /// The name as extracted from post text.
    pub name: String,
    /// Resolved canonical title (may differ in casing/diacritics from `name`).
    pub title: String,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub thumbnail_url: Option<String>,
    pub source_url: Option<String>,
    /// How many posts in the batch mentioned this entity.
    #[serde(default)]
    pub mentions: usize,
}

/// Crowd mood bucket derived from mean polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vibe {
    Hype,
    Salty,
    Neutral,
}

impl Vibe {
    /// Bucket a mean polarity: above `0.2` is hype, below `-0.2` is salty.
    #[must_use]
    pub fn from_mean_polarity(mean: f32) -> Self {
        if mean > 0.2 {
            Vibe::Hype
        } else if mean < -0.2 {
            Vibe::Salty
        } else {
            Vibe::Neutral
        }
    }

    /// Shout-case form used in meme copy.
    #[must_use]
    pub fn shout(self) -> &'static str {
        match self {
            Vibe::Hype => "HYPE",
            Vibe::Salty => "SALTY",
            Vibe::Neutral => "NEUTRAL",
        }
    }
}

impl std::fmt::Display for Vibe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Vibe::Hype => write!(f, "hype"),
            Vibe::Salty => write!(f, "salty"),
            Vibe::Neutral => write!(f, "neutral"),
        }
    }
}
