//! User profile endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use quill_common::AppResult;
use quill_core::ProfileFeed;
use quill_db::Page;
use serde::Serialize;

use crate::{
    extractors::{MaybeAuthUser, PageQuery},
    middleware::AppState,
    response::{ApiResponse, PostResponse, UserResponse},
};

/// An author's profile with one page of their posts.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub author: UserResponse,
    pub page: Page<PostResponse>,
    pub following: bool,
    pub posts_count: u64,
    pub followers_count: u64,
    pub following_count: u64,
}

impl From<ProfileFeed> for ProfileResponse {
    fn from(feed: ProfileFeed) -> Self {
        Self {
            author: feed.author.into(),
            page: feed.page.map(PostResponse::from),
            following: feed.following,
            posts_count: feed.posts_count,
            followers_count: feed.followers_count,
            following_count: feed.following_count,
        }
    }
}

async fn profile(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let feed = state
        .feed_service
        .profile(&viewer.viewer(), &username, query.number())
        .await?;

    Ok(ApiResponse::ok(feed.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/profile/{username}/", get(profile))
}
