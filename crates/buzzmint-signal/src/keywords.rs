//! Vibe-aligned keyword extraction for meme copy.

use std::collections::HashMap;

use buzzmint_core::{Post, SentimentScore, Vibe};

/// How many keywords the composer can actually fit.
pub const DEFAULT_KEYWORD_LIMIT: usize = 6;

/// A post counts as vibe-aligned when its polarity clears this bar in the
/// vibe's direction.
const ALIGNMENT_THRESHOLD: f32 = 0.10;

const MIN_TOKEN_LEN: usize = 3;

/// Generic chatter that never makes a good meme keyword.
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "that", "this", "with", "have", "from", "they", "will",
    "what", "when", "where", "your", "just", "like", "about", "them", "there",
    "their", "would", "could", "should", "been", "being", "were", "was", "are",
    "you", "all", "can", "had", "has", "his", "her", "him", "she", "our", "out",
    "who", "why", "how", "its", "not", "but", "get", "got", "one", "two", "too",
    "very", "really", "over", "under", "after", "before", "into", "still",
    "even", "only", "much", "many", "more", "most", "some", "any", "every",
    "each", "also", "than", "then", "now", "here", "because", "while", "did",
    "does", "doing", "gonna", "wanna", "yeah", "omg", "lol", "bro", "dude",
    "guys", "literally", "actually", "right", "back", "down", "off", "man",
    // Feed furniture
    "game", "team", "play", "watch", "live", "thread", "post", "reddit",
    "edit", "deleted", "removed",
];

/// Rank keywords from the posts whose polarity agrees with the batch vibe.
///
/// A hype batch draws its words from the excited posts and a salty batch from
/// the hostile ones, so the copy on the image matches the mood in the caption.
/// Neutral keeps everything. If the alignment filter leaves nothing (a hype
/// vibe carried by barely-positive posts, say), the whole batch is used
/// instead; a populated batch never yields zero keywords for want of aligned
/// posts. Ties rank alphabetically so output is stable.
#[must_use]
pub fn extract_keywords(
    posts: &[Post],
    scores: &[SentimentScore],
    vibe: Vibe,
    limit: usize,
) -> Vec<String> {
    let polarity_by_id: HashMap<&str, f32> = scores
        .iter()
        .map(|s| (s.post_id.as_str(), s.polarity))
        .collect();

    let aligned: Vec<String> = posts
        .iter()
        .filter(|p| {
            let polarity = polarity_by_id.get(p.id.as_str()).copied().unwrap_or(0.0);
            match vibe {
                Vibe::Hype => polarity >= ALIGNMENT_THRESHOLD,
                Vibe::Salty => polarity <= -ALIGNMENT_THRESHOLD,
                Vibe::Neutral => true,
            }
        })
        .map(Post::text)
        .collect();

    let corpus: Vec<String> = if aligned.is_empty() {
        posts.iter().map(Post::text).collect()
    } else {
        aligned
    };

    let mut counts: HashMap<String, usize> = HashMap::new();
    for text in &corpus {
        for token in tokens(text) {
            if STOPWORDS.contains(&token.as_str()) {
                continue;
            }
            *counts.entry(token).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked.into_iter().map(|(word, _)| word).collect()
}

/// Lowercase alphabetic runs of at least [`MIN_TOKEN_LEN`] characters.
fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .map(str::to_lowercase)
        .collect()
}
