//! Keyword-table moment classification over a scored batch.

use std::collections::HashMap;

use buzzmint_core::{Moment, MomentRule, MomentTable, Post, SentimentScore};

/// Share of confidence carried by the fraction of the batch that matched.
const MATCH_WEIGHT: f32 = 0.5;
/// Share carried by matched-post popularity.
const POPULARITY_WEIGHT: f32 = 0.3;
/// Share carried by how fresh the newest matched post is.
const RECENCY_WEIGHT: f32 = 0.2;

/// Total matched score at which the popularity term reaches 0.5.
const POPULARITY_PIVOT: f32 = 200.0;
/// Recency halves every 30 minutes behind the newest post in the batch.
const RECENCY_HALF_LIFE_SECS: f32 = 1800.0;
/// Recency assumed when no matched post carries a timestamp.
const RECENCY_FLOOR: f32 = 0.25;

/// Run every rule in the table against the batch and return detected moments,
/// strongest first.
///
/// Matching is case-insensitive on word boundaries; multi-word terms match as
/// phrases. Rules with no matching posts are omitted entirely, so an empty or
/// matchless batch yields an empty vec. Ordering is confidence descending,
/// then matched-post count descending, then label ascending, which keeps the
/// output stable for equal-strength moments.
#[must_use]
pub fn classify(posts: &[Post], scores: &[SentimentScore], table: &MomentTable) -> Vec<Moment> {
    if posts.is_empty() {
        return Vec::new();
    }

    let polarity_by_id: HashMap<&str, f32> = scores
        .iter()
        .map(|s| (s.post_id.as_str(), s.polarity))
        .collect();
    let newest = posts.iter().filter_map(|p| p.created_utc).max();

    // Normalize each post once; every rule probes the same padded haystack.
    let prepared: Vec<(String, &Post)> = posts
        .iter()
        .map(|p| (padded_haystack(&p.text()), p))
        .collect();

    let mut moments: Vec<Moment> = Vec::new();
    for rule in &table.rules {
        let matched: Vec<&Post> = prepared
            .iter()
            .filter(|(haystack, _)| rule_matches(haystack, rule))
            .map(|(_, post)| *post)
            .collect();
        if matched.is_empty() {
            continue;
        }

        let mut matched_ids: Vec<String> = matched.iter().map(|p| p.id.clone()).collect();
        matched_ids.sort();
        matched_ids.dedup();

        #[allow(clippy::cast_precision_loss)]
        let match_ratio = matched_ids.len() as f32 / posts.len() as f32;
        let popularity = popularity_term(&matched);
        let recency = recency_term(&matched, newest);
        let confidence = (rule.weight
            * (MATCH_WEIGHT * match_ratio
                + POPULARITY_WEIGHT * popularity
                + RECENCY_WEIGHT * recency))
            .clamp(0.0, 1.0);

        #[allow(clippy::cast_precision_loss)]
        let aggregate_sentiment = matched_ids
            .iter()
            .map(|id| polarity_by_id.get(id.as_str()).copied().unwrap_or(0.0))
            .sum::<f32>()
            / matched_ids.len() as f32;

        moments.push(Moment {
            label: rule.label.clone(),
            matched_posts: matched_ids,
            confidence,
            aggregate_sentiment,
        });
    }

    moments.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| b.matched_posts.len().cmp(&a.matched_posts.len()))
            .then_with(|| a.label.cmp(&b.label))
    });
    moments
}

/// Lowercase `text`, replace every non-alphanumeric run with a single space,
/// and pad with spaces so every word sits between two separators.
fn padded_haystack(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len() + 2);
    normalized.push(' ');
    let mut last_was_space = true;
    for c in text.chars() {
        if c.is_alphanumeric() {
            for lower in c.to_lowercase() {
                normalized.push(lower);
            }
            last_was_space = false;
        } else if !last_was_space {
            normalized.push(' ');
            last_was_space = true;
        }
    }
    if !last_was_space {
        normalized.push(' ');
    }
    normalized
}

fn rule_matches(haystack: &str, rule: &MomentRule) -> bool {
    rule.terms.iter().any(|term| {
        let needle = padded_haystack(term);
        !needle.trim().is_empty() && haystack.contains(&needle)
    })
}

/// Saturating popularity over the matched posts' combined score. Negative
/// scores count as zero so brigaded posts cannot drag a moment below floor.
fn popularity_term(matched: &[&Post]) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let total: f32 = matched.iter().map(|p| p.score.max(0) as f32).sum();
    total / (total + POPULARITY_PIVOT)
}

/// Exponential-decay freshness of the newest matched post, relative to the
/// newest post anywhere in the batch. Posts without timestamps contribute the
/// floor, so a moment never scores zero recency just because the feed omitted
/// `created_utc`.
fn recency_term(
    matched: &[&Post],
    newest: Option<chrono::DateTime<chrono::Utc>>,
) -> f32 {
    let Some(newest) = newest else {
        return RECENCY_FLOOR;
    };
    matched
        .iter()
        .filter_map(|p| p.created_utc)
        .map(|ts| {
            #[allow(clippy::cast_precision_loss)]
            let age_secs = (newest - ts).num_seconds().max(0) as f32;
            0.5_f32.powf(age_secs / RECENCY_HALF_LIFE_SECS)
        })
        .fold(RECENCY_FLOOR, f32::max)
}
