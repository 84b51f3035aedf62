//! Group endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use quill_common::AppResult;
use quill_core::GroupFeed;
use quill_db::Page;
use serde::Serialize;

use crate::{
    extractors::PageQuery,
    middleware::AppState,
    response::{ApiResponse, GroupResponse, PostResponse},
};

/// A group and one page of its posts.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupFeedResponse {
    pub group: GroupResponse,
    pub page: Page<PostResponse>,
}

impl From<GroupFeed> for GroupFeedResponse {
    fn from(feed: GroupFeed) -> Self {
        Self {
            group: feed.group.into(),
            page: feed.page.map(PostResponse::from),
        }
    }
}

/// Posts filed under a group.
async fn group_feed(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<GroupFeedResponse>> {
    let feed = state.feed_service.group(&slug, query.number()).await?;

    Ok(ApiResponse::ok(feed.into()))
}

/// Every group, for picking one when writing a post.
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<GroupResponse>>> {
    let groups = state.group_service.list().await?;

    Ok(ApiResponse::ok(groups.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/group/{slug}/", get(group_feed))
        .route("/groups/", get(list))
}
