//! Following endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post},
};
use quill_common::{AppError, AppResult};
use quill_db::Page;

use super::profile_url;
use crate::{
    extractors::{AuthUser, PageQuery},
    middleware::AppState,
    response::{ApiResponse, PostResponse, found},
};

/// Posts by the authors the viewer follows.
async fn follow_feed(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Page<PostResponse>>> {
    let page = state
        .feed_service
        .follow(&user.viewer(), query.number())
        .await?;

    Ok(ApiResponse::ok(page.map(PostResponse::from)))
}

/// Follow an author. Following yourself just lands back on your profile.
async fn follow(
    State(state): State<AppState>,
    user: AuthUser,
    Path(username): Path<String>,
) -> AppResult<Response> {
    match state
        .following_service
        .follow(&user.viewer(), &username)
        .await
    {
        Ok(_) | Err(AppError::Forbidden(_)) => Ok(found(&profile_url(&username))),
        Err(e) => Err(e),
    }
}

async fn unfollow(
    State(state): State<AppState>,
    user: AuthUser,
    Path(username): Path<String>,
) -> AppResult<Response> {
    state
        .following_service
        .unfollow(&user.viewer(), &username)
        .await?;

    Ok(found(&profile_url(&username)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/follow/", get(follow_feed))
        .route("/profile/{username}/follow/", post(follow))
        .route("/profile/{username}/unfollow/", post(unfollow))
}
