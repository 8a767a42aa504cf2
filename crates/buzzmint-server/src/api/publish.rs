use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Serialize;

use buzzmint_publish::PublishOutcome;

use crate::middleware::RequestId;

use super::meme::{compose_from_query, MemeQuery};
use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct PublishData {
    pub outcome: PublishOutcome,
    pub caption: String,
    pub style: &'static str,
    pub variant: usize,
}

/// Compose a meme and push it to the configured platform. An unconfigured
/// or rejected publish is still a 200; the outcome field says what happened.
pub(super) async fn publish_meme(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<MemeQuery>,
) -> Result<Json<ApiResponse<PublishData>>, ApiError> {
    let composed = compose_from_query(&state, &req_id.0, query).await?;

    let outcome = state
        .publisher
        .post_image(&composed.image.bytes, &composed.caption)
        .await;

    Ok(Json(ApiResponse {
        data: PublishData {
            outcome,
            caption: composed.caption,
            style: composed.style.tag(),
            variant: composed.image.variant,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
