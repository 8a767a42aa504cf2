use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use buzzmint_signal::TrendSummary;

use crate::middleware::RequestId;

use super::{normalize_limit, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct TrendQuery {
    pub subreddit: Option<String>,
    pub q: Option<String>,
    pub limit: Option<usize>,
}

/// One full trend pass. Infallible: upstream failures degrade to an empty
/// summary inside the aggregator, so this always returns 200 with data.
pub(super) async fn get_trend(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<TrendQuery>,
) -> Json<ApiResponse<TrendSummary>> {
    let subreddit = query
        .subreddit
        .unwrap_or_else(|| state.defaults.subreddit.clone());
    let q = query.q.unwrap_or_else(|| state.defaults.query.clone());
    let limit = normalize_limit(query.limit);

    let summary = state.aggregator.aggregate(&subreddit, &q, limit).await;

    Json(ApiResponse {
        data: summary,
        meta: ResponseMeta::new(req_id.0),
    })
}
