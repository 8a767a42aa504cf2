//! Lexicon scorer for live-broadcast crowd chatter.

use std::collections::HashMap;

use buzzmint_core::{Post, SentimentScore};

/// Crowd-mood word weights.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` read as excited,
/// in `[-1.0, 0.0)` as hostile. Polarity is the clamped sum of matching
/// weights; magnitude is the clamped sum of their absolute values.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Excited signals
    ("amazing", 0.5),
    ("awesome", 0.5),
    ("great", 0.4),
    ("love", 0.5),
    ("epic", 0.5),
    ("goat", 0.6),
    ("clutch", 0.5),
    ("insane", 0.4),
    ("wild", 0.3),
    ("fire", 0.5),
    ("hype", 0.5),
    ("win", 0.4),
    ("winning", 0.4),
    ("victory", 0.5),
    ("best", 0.5),
    ("beautiful", 0.4),
    ("perfect", 0.5),
    ("legend", 0.5),
    ("legendary", 0.6),
    ("incredible", 0.5),
    ("electric", 0.5),
    ("unreal", 0.4),
    ("dominant", 0.4),
    ("comeback", 0.4),
    // Hostile signals
    ("terrible", -0.6),
    ("awful", -0.6),
    ("trash", -0.6),
    ("robbed", -0.5),
    ("rigged", -0.6),
    ("choke", -0.5),
    ("choked", -0.6),
    ("brutal", -0.4),
    ("pathetic", -0.6),
    ("horrible", -0.6),
    ("worst", -0.6),
    ("hate", -0.5),
    ("boring", -0.4),
    ("pain", -0.4),
    ("ruined", -0.5),
    ("embarrassing", -0.5),
    ("fraud", -0.5),
    ("overrated", -0.4),
    ("disaster", -0.6),
    ("miserable", -0.5),
];

/// Score a text string against the crowd lexicon.
///
/// Splits text into lowercase words, strips surrounding punctuation, and sums
/// matching weights into `(polarity, magnitude)`. Both components are clamped,
/// polarity to `[-1.0, 1.0]` and magnitude to `[0.0, 1.0]`. Empty or unknown
/// text scores `(0.0, 0.0)`.
#[must_use]
pub fn score_text(text: &str) -> (f32, f32) {
    let mut polarity = 0.0_f32;
    let mut magnitude = 0.0_f32;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        for &(lex_word, weight) in LEXICON {
            if w == lex_word {
                polarity += weight;
                magnitude += weight.abs();
                break;
            }
        }
    }
    (polarity.clamp(-1.0, 1.0), magnitude.clamp(0.0, 1.0))
}

/// Score one post's combined title and body.
#[must_use]
pub fn score_post(post: &Post) -> SentimentScore {
    let (polarity, magnitude) = score_text(&post.text());
    SentimentScore {
        post_id: post.id.clone(),
        polarity,
        magnitude,
    }
}

/// Score a batch, one entry per post in input order.
///
/// Posts sharing an id (feed glitches duplicate crossposts occasionally) are
/// scored once and the result reused.
#[must_use]
pub fn score_posts(posts: &[Post]) -> Vec<SentimentScore> {
    let mut memo: HashMap<&str, SentimentScore> = HashMap::new();
    posts
        .iter()
        .map(|post| {
            memo.entry(post.id.as_str())
                .or_insert_with(|| score_post(post))
                .clone()
        })
        .collect()
}

/// Mean polarity across a batch of scores. Empty input is `0.0`.
#[must_use]
pub fn mean_polarity(scores: &[SentimentScore]) -> f32 {
    if scores.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = scores.len() as f32;
    scores.iter().map(|s| s.polarity).sum::<f32>() / count
}
