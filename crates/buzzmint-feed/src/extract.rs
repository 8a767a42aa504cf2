//! Listing-to-post conversion and image URL extraction.
//!
//! Reddit hides images in four different places depending on how the post was
//! made: a direct link, a gallery (`media_metadata`), a crosspost's parent
//! payload, or the `preview` block. All are tried; the order below reflects
//! which source tends to give the cleanest full-resolution URL.

use chrono::{DateTime, Utc};

use buzzmint_core::Post;

use crate::client::PostData;

const MAX_BODY_CHARS: usize = 500;

/// Convert one listing child into a [`Post`], or `None` when it is unusable
/// (deleted, untitled, or otherwise empty).
pub(crate) fn post_from_data(data: PostData) -> Option<Post> {
    let title = data
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty() && *t != "[deleted]" && *t != "[removed]")?
        .to_string();

    let id = data
        .name
        .clone()
        .or_else(|| data.id.as_ref().map(|id| format!("t3_{id}")))?;

    let body = match data.selftext.as_deref() {
        Some(text) if !text.is_empty() && text != "[deleted]" && text != "[removed]" => {
            text.chars().take(MAX_BODY_CHARS).collect::<String>()
        }
        _ => String::new(),
    };

    let author = data
        .author
        .clone()
        .filter(|a| !a.is_empty() && a != "[deleted]");

    let url = data
        .permalink
        .as_ref()
        .map(|p| format!("https://reddit.com{p}"))
        .or_else(|| data.url.clone());

    let created_utc = data.created_utc.and_then(epoch_to_datetime);
    let image_urls = collect_image_urls(&data);

    Some(Post {
        id,
        author,
        title,
        body,
        score: data.score.unwrap_or(0),
        created_utc,
        url,
        image_urls,
    })
}

#[allow(clippy::cast_possible_truncation)]
fn epoch_to_datetime(epoch: f64) -> Option<DateTime<Utc>> {
    if !epoch.is_finite() || epoch < 0.0 {
        return None;
    }
    DateTime::from_timestamp(epoch as i64, 0)
}

/// Pull every plausible image URL out of a post payload, best first.
pub(crate) fn collect_image_urls(data: &PostData) -> Vec<String> {
    let mut urls = Vec::new();

    collect_gallery_urls(data, &mut urls);

    if let Some(direct) = data
        .url_overridden_by_dest
        .as_deref()
        .or(data.url.as_deref())
    {
        if is_image_url(direct) {
            urls.push(unescape_html(direct));
        }
    }

    if let Some(preview) = &data.preview {
        for image in &preview.images {
            if let Some(url) = image.source.as_ref().and_then(|s| s.url.as_deref()) {
                urls.push(unescape_html(url));
            }
        }
    }

    // Crossposts carry the original post's payload; one level is enough.
    if let Some(parents) = &data.crosspost_parent_list {
        for parent in parents {
            collect_gallery_urls(parent, &mut urls);
            if let Some(direct) = parent
                .url_overridden_by_dest
                .as_deref()
                .or(parent.url.as_deref())
            {
                if is_image_url(direct) {
                    urls.push(unescape_html(direct));
                }
            }
            if let Some(preview) = &parent.preview {
                for image in &preview.images {
                    if let Some(url) = image.source.as_ref().and_then(|s| s.url.as_deref()) {
                        urls.push(unescape_html(url));
                    }
                }
            }
        }
    }

    dedup_preserving_order(urls)
}

/// Gallery images live in `media_metadata`, keyed by media id. `gallery_data`
/// gives the display order; without it, sorted keys keep the result stable.
fn collect_gallery_urls(data: &PostData, urls: &mut Vec<String>) {
    let Some(metadata) = &data.media_metadata else {
        return;
    };

    let ordered_ids: Vec<String> = match &data.gallery_data {
        Some(gallery) => gallery.items.iter().map(|i| i.media_id.clone()).collect(),
        None => {
            let mut keys: Vec<String> = metadata.keys().cloned().collect();
            keys.sort();
            keys
        }
    };

    for id in ordered_ids {
        let Some(meta) = metadata.get(&id) else {
            continue;
        };
        if meta.status.as_deref() != Some("valid") {
            continue;
        }
        let source = meta
            .s
            .as_ref()
            .and_then(|s| s.u.as_deref().or(s.gif.as_deref()));
        if let Some(url) = source {
            urls.push(unescape_html(url));
        }
    }
}

fn is_image_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    let path = lower.split('?').next().unwrap_or(&lower);
    if path.ends_with(".jpg")
        || path.ends_with(".jpeg")
        || path.ends_with(".png")
        || path.ends_with(".webp")
        || path.ends_with(".gif")
    {
        return true;
    }
    lower.starts_with("https://i.redd.it/") || lower.starts_with("https://i.imgur.com/")
}

/// Reddit HTML-escapes URLs in JSON unless `raw_json=1` is honored; unescape
/// defensively either way.
fn unescape_html(url: &str) -> String {
    url.replace("&amp;", "&")
}

fn dedup_preserving_order(urls: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    urls.into_iter().filter(|u| seen.insert(u.clone())).collect()
}
