use std::collections::HashSet;

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use buzzmint_composer::{build_caption, MemeImage, MemeSpec, MemeStyle, MomentTag};
use buzzmint_core::Vibe;
use buzzmint_signal::TrendSummary;

use crate::middleware::RequestId;

use super::{normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

/// Promotion fallbacks when the caller supplies none; the demo must always
/// have something to sell.
const DEFAULT_BUSINESS: &str = "local pizza shop";
const DEFAULT_OFFER: &str = "15% OFF";

const DEFAULT_STYLE: &str = "grid";
const DEFAULT_TILES: u8 = 4;

/// Most post photos the gallery will carry into one compose.
const GALLERY_LIMIT: usize = 8;

#[derive(Debug, Deserialize)]
pub(super) struct MemeQuery {
    pub business: Option<String>,
    pub offer: Option<String>,
    pub subreddit: Option<String>,
    pub q: Option<String>,
    pub limit: Option<usize>,
    pub style: Option<String>,
    pub tiles: Option<u8>,
    pub randomize: Option<bool>,
    pub seed: Option<u64>,
    pub with_portrait: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(super) struct MemeData {
    pub caption: String,
    pub image_data_url: String,
    pub style: &'static str,
    pub variant: usize,
    pub width: u32,
    pub height: u32,
    pub mood: Vibe,
    pub keywords: Vec<String>,
    pub mean_polarity: f32,
    pub subreddit: String,
    pub query: String,
}

pub(super) struct ComposedMeme {
    pub summary: TrendSummary,
    pub image: MemeImage,
    pub caption: String,
    pub style: MemeStyle,
}

/// Run the trend pass and compose a meme from it. Shared by the JSON, PNG,
/// and publish endpoints so they cannot drift apart.
pub(super) async fn compose_from_query(
    state: &AppState,
    request_id: &str,
    query: MemeQuery,
) -> Result<ComposedMeme, ApiError> {
    let style = MemeStyle::from_tag(
        query.style.as_deref().unwrap_or(DEFAULT_STYLE),
        query.tiles.unwrap_or(DEFAULT_TILES),
    )
    .map_err(|e| ApiError::new(request_id, "validation_error", e.to_string()))?;

    let subreddit = query
        .subreddit
        .unwrap_or_else(|| state.defaults.subreddit.clone());
    let q = query.q.unwrap_or_else(|| state.defaults.query.clone());
    let limit = normalize_limit(query.limit);
    let summary = state.aggregator.aggregate(&subreddit, &q, limit).await;

    let business = query
        .business
        .unwrap_or_else(|| DEFAULT_BUSINESS.to_string());
    let offer = query.offer.unwrap_or_else(|| DEFAULT_OFFER.to_string());

    let mut seen = HashSet::new();
    let gallery: Vec<String> = summary
        .posts
        .iter()
        .flat_map(|post| post.image_urls.iter())
        .filter(|url| seen.insert((*url).clone()))
        .take(GALLERY_LIMIT)
        .cloned()
        .collect();

    // A supplied seed implies randomize; a fixed-layout call with a seed
    // would silently ignore it.
    let randomize = query.randomize.unwrap_or(true) || query.seed.is_some();

    let spec = MemeSpec::builder(business, offer)
        .moment(summary.top_moment.as_ref().map(MomentTag::from))
        .entity_profile(summary.top_entity.clone())
        .vibe(summary.vibe)
        .keywords(summary.keywords.clone())
        .style(style)
        .gallery(gallery)
        .with_portrait(query.with_portrait.unwrap_or(true))
        .randomize(randomize)
        .seed(query.seed)
        .size(state.defaults.width, state.defaults.height)
        .build()
        .map_err(|e| ApiError::new(request_id, "validation_error", e.to_string()))?;

    let caption = build_caption(
        summary.vibe,
        &summary.keywords,
        spec.business_name(),
        spec.offer_text(),
    );
    let image = state.composer.compose(&spec).await.map_err(|e| {
        tracing::error!(error = %e, "meme composition failed");
        ApiError::new(request_id, "internal_error", "meme composition failed")
    })?;

    Ok(ComposedMeme {
        summary,
        image,
        caption,
        style,
    })
}

pub(super) async fn get_meme(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<MemeQuery>,
) -> Result<Json<ApiResponse<MemeData>>, ApiError> {
    let composed = compose_from_query(&state, &req_id.0, query).await?;

    Ok(Json(ApiResponse {
        data: MemeData {
            caption: composed.caption,
            image_data_url: composed.image.to_data_url(),
            style: composed.style.tag(),
            variant: composed.image.variant,
            width: composed.image.width,
            height: composed.image.height,
            mood: composed.summary.vibe,
            keywords: composed.summary.keywords,
            mean_polarity: composed.summary.mean_polarity,
            subreddit: composed.summary.subreddit,
            query: composed.summary.query,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// The same composition as [`get_meme`], returned as raw PNG for `<img>`
/// tags and curl pipelines.
pub(super) async fn get_meme_png(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<MemeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let composed = compose_from_query(&state, &req_id.0, query).await?;
    Ok((
        [(header::CONTENT_TYPE, composed.image.media_type)],
        composed.image.bytes,
    ))
}
