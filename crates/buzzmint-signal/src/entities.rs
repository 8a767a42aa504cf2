//! Capitalized-span name candidate extraction.
//!
//! Deliberately over-detects: anything shaped like a name survives unless a
//! filter positively rejects it. The Wikipedia verification step downstream
//! is what decides whether a candidate is a real person, so false positives
//! here cost one lookup, while false negatives lose the entity for good.

use std::sync::LazyLock;

use buzzmint_core::{Post, Stoplist};
use regex::Regex;

/// Two to four consecutive capitalized words.
static NAME_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+){1,3})\b")
        .expect("name-span regex is valid")
});

/// First tokens that mark a span as headline furniture rather than a name.
const LEADING_STOP_TOKENS: &[&str] = &[
    "The", "This", "That", "These", "Those", "What", "When", "Where", "Why", "How", "Who",
    "Breaking", "Live", "Watch", "Official", "Game", "Team", "Post", "Match", "Daily",
    "Weekly", "Highlight", "Highlights", "Thread", "Report", "Update",
];

/// Calendar words anywhere in a span disqualify it ("Monday Night", "Friday
/// Feb" and friends survive every other filter).
const CALENDAR_TOKENS: &[&str] = &[
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
    "January", "February", "March", "April", "May", "June", "July", "August",
    "September", "October", "November", "December",
];

/// Extract plausible person-name candidates from one text, in order of first
/// appearance, deduplicated case-insensitively.
#[must_use]
pub fn extract_names(text: &str, stoplist: &Stoplist) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut names = Vec::new();
    for caps in NAME_SPAN_RE.captures_iter(text) {
        let candidate = caps[1].trim();
        if !plausible_name(candidate, stoplist) {
            continue;
        }
        let key = candidate.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        names.push(candidate.to_string());
    }
    names
}

fn plausible_name(candidate: &str, stoplist: &Stoplist) -> bool {
    if stoplist.contains(candidate) {
        return false;
    }
    let tokens: Vec<&str> = candidate.split_whitespace().collect();
    if tokens.len() < 2 {
        return false;
    }
    if LEADING_STOP_TOKENS.contains(&tokens[0]) {
        return false;
    }
    if tokens.iter().any(|t| CALENDAR_TOKENS.contains(t)) {
        return false;
    }
    true
}

/// Count candidate mentions across the batch and rank them.
///
/// A candidate counts once per post that mentions it, however many times the
/// post repeats the name. Ranking is mention count descending, then name
/// ascending, so equal counts come out in a stable order.
#[must_use]
pub fn rank_candidates(posts: &[Post], stoplist: &Stoplist) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = Vec::new();
    for post in posts {
        for name in extract_names(&post.text(), stoplist) {
            let key = name.to_lowercase();
            if let Some(entry) = ranked.iter_mut().find(|(n, _)| n.to_lowercase() == key) {
                entry.1 += 1;
            } else {
                ranked.push((name, 1));
            }
        }
    }
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}
