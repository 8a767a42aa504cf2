//! Checks that gate a search hit before it becomes a profile.

/// Occupation words that mark a page description as describing a person.
///
/// Fallback for when the Wikidata instance-of claim is missing or
/// unreachable. Matched as lowercase substrings, so "american football"
/// catches "American football quarterback" and similar.
const PERSON_HINTS: &[&str] = &[
    "actor",
    "actress",
    "singer",
    "rapper",
    "musician",
    "comedian",
    "american football",
    "quarterback",
    "wide receiver",
    "tight end",
    "athlete",
    "player",
    "coach",
];

/// Whether the search hit is plausibly about the candidate at all.
///
/// Wikipedia search happily returns "List of Super Bowl champions" for a
/// misparsed name; requiring at least one shared word between candidate and
/// title throws those out.
pub(crate) fn titles_align(candidate: &str, title: &str) -> bool {
    let title_tokens: Vec<String> = tokens(title);
    tokens(candidate)
        .iter()
        .any(|t| title_tokens.contains(t))
}

/// Whether a page description sounds like a person.
pub(crate) fn description_suggests_person(description: Option<&str>) -> bool {
    let Some(description) = description else {
        return false;
    };
    let lower = description.to_lowercase();
    PERSON_HINTS.iter().any(|hint| lower.contains(hint))
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}
