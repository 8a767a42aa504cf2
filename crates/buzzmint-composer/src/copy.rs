//! Promotional copy lines built from live-signal context.
//!
//! Classic memes draw from a pool of top/bottom pairs so repeated renders
//! with randomize on feel fresh; cards use one deterministic layout. The
//! business name and offer always survive into the rendered output, either
//! woven into the lines or via the call-to-action band.

use buzzmint_core::types::Vibe;

use crate::layout::Chooser;
use crate::spec::MomentTag;

/// Probability that the offer gets woven into the bottom line.
const OFFER_WEAVE_CHANCE: f64 = 0.25;

/// Probability that the business name leads the top line.
const BUSINESS_TOP_CHANCE: f64 = 0.10;

const KEYWORD_FALLBACKS: [&str; 3] = ["THE GAME", "VIBES", "CHAOS"];

fn keyword_or(keywords: &[String], index: usize) -> String {
    keywords
        .get(index)
        .map(|k| k.to_uppercase())
        .unwrap_or_else(|| KEYWORD_FALLBACKS[index.min(KEYWORD_FALLBACKS.len() - 1)].to_string())
}

fn event_label(moment: Option<&MomentTag>) -> String {
    moment
        .map(|m| m.label.to_uppercase())
        .unwrap_or_else(|| "THE MOMENT".to_string())
}

/// Top/bottom line pairs for the classic style. Four pairs are always
/// available; each vibe contributes two more of its own.
pub(crate) fn classic_copy_pool(
    vibe: Vibe,
    keywords: &[String],
    moment: Option<&MomentTag>,
) -> Vec<(String, String)> {
    let k1 = keyword_or(keywords, 0);
    let k2 = keyword_or(keywords, 1);
    let k3 = keyword_or(keywords, 2);
    let mood = vibe.shout();
    let event = event_label(moment);

    let mut pool = vec![
        (
            format!("{event} JUST HAPPENED"),
            format!("AND THE CHAT IS PURE {mood}"),
        ),
        (
            format!("EVERYONE TALKING ABOUT {k1}"),
            format!("{k2} \u{b7} {k3} \u{b7} {mood}"),
        ),
        (
            format!("LIVE CHECK: {k1}"),
            format!("{event} HAS THE TIMELINE IN {mood} MODE"),
        ),
        (
            format!("{mood} ALERT"),
            format!("{k1} AND {k2} ARE EVERYWHERE"),
        ),
    ];

    match vibe {
        Vibe::Hype => pool.extend([
            (
                format!("NOBODY IS CALM ABOUT {k1}"),
                "AND HONESTLY? SAME".to_string(),
            ),
            (
                format!("{event} ENERGY"),
                format!("{k1} \u{b7} {k2} \u{b7} LET'S GO"),
            ),
        ]),
        Vibe::Salty => pool.extend([
            (
                format!("{k1} AGAIN?"),
                "THE GROUP CHAT IS NOT OK".to_string(),
            ),
            (
                format!("REFS, {event}, {k1}"),
                "PICK A STRUGGLE".to_string(),
            ),
        ]),
        Vibe::Neutral => pool.extend([
            (
                format!("QUIET ONE SO FAR: {k1}"),
                format!("{k2} WATCHERS KNOW"),
            ),
            (
                format!("STATUS REPORT: {event}"),
                format!("{k1} \u{b7} {k2} \u{b7} STEADY"),
            ),
        ]),
    }
    pool
}

/// Pick a classic pair and maybe weave the promotion into the lines.
pub(crate) fn pick_classic_copy(
    chooser: &mut Chooser,
    vibe: Vibe,
    keywords: &[String],
    moment: Option<&MomentTag>,
    business: &str,
    offer: &str,
) -> (String, String) {
    let pool = classic_copy_pool(vibe, keywords, moment);
    let index = chooser.pick(pool.len());
    let (mut top, mut bottom) = pool[index].clone();

    if chooser.chance(OFFER_WEAVE_CHANCE) {
        bottom = format!("{bottom} \u{b7} {}", offer.to_uppercase());
    }
    if chooser.chance(BUSINESS_TOP_CHANCE) {
        top = format!("{}: {top}", business.to_uppercase());
    }
    (top, bottom)
}

/// Card copy: headline, punchline, and call-to-action. Deterministic for a
/// given context.
pub(crate) fn card_copy(
    vibe: Vibe,
    moment: Option<&MomentTag>,
    business: &str,
    offer: &str,
    entity_title: Option<&str>,
) -> (String, String, String) {
    let event = event_label(moment);
    let headline = format!("{event} REACTION");

    let mood_line = match vibe {
        Vibe::Hype => "The feed cannot handle this.",
        Vibe::Salty => "The feed is in shambles.",
        Vibe::Neutral => "The feed is watching closely.",
    };
    let mut punchline = String::from(mood_line);
    if let Some(title) = entity_title {
        punchline.push_str(&format!(" Feat: {title}."));
    }
    punchline.push_str(&format!(" {business}: fuel up now."));

    (headline, punchline, offer.to_uppercase())
}

/// Social caption to accompany a published meme.
#[must_use]
pub fn build_caption(vibe: Vibe, keywords: &[String], business: &str, offer: &str) -> String {
    let mood = vibe.shout();
    let tags: Vec<String> = keywords.iter().take(3).map(|k| format!("#{k}")).collect();
    if tags.is_empty() {
        format!("{mood} check \u{b7} {offer} at {business}")
    } else {
        format!("{mood} check \u{b7} {} \u{b7} {offer} at {business}", tags.join(" "))
    }
}
