//! Post endpoints.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post},
};
use quill_common::{AppError, AppResult};
use quill_core::{CommentInput, PostDetail, PostInput};
use serde::Serialize;

use super::{post_url, profile_url};
use crate::{
    extractors::{AuthUser, MaybeAuthUser, PageQuery},
    middleware::AppState,
    response::{ApiResponse, CommentResponse, PostResponse, found, json_bytes},
};

/// A post with its comments and the viewer's affordances.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailResponse {
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
    pub comments_count: u64,
    pub can_edit: bool,
    pub can_comment: bool,
}

impl From<PostDetail> for PostDetailResponse {
    fn from(detail: PostDetail) -> Self {
        Self {
            post: detail.post.into(),
            comments: detail.comments.into_iter().map(Into::into).collect(),
            comments_count: detail.comments_count,
            can_edit: detail.can_edit,
            can_comment: detail.can_comment,
        }
    }
}

/// Newest posts from everyone.
///
/// The first page is served from the index cache while it is fresh.
async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let page = query.number();
    let cacheable = page.is_none_or(|n| n <= 1);
    if cacheable && let Some(body) = state.index_cache.get().await {
        return Ok(json_bytes(body));
    }

    let page = state.feed_service.index(page).await?;
    let body = serde_json::to_vec(&ApiResponse::ok(page.map(PostResponse::from)))
        .map(Bytes::from)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if cacheable {
        state.index_cache.set(body.clone()).await;
    }

    Ok(json_bytes(body))
}

/// A single post with its comments.
async fn detail(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<PostDetailResponse>> {
    let detail = state
        .feed_service
        .post_detail(&viewer.viewer(), &post_id)
        .await?;

    Ok(ApiResponse::ok(detail.into()))
}

/// Publish a post, then go to the author's profile.
async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<PostInput>,
) -> AppResult<Response> {
    state.post_service.create_post(&user.viewer(), input).await?;

    Ok(found(&profile_url(&user.0.username)))
}

/// Edit a post. Anyone but the author is sent back to the post.
async fn edit(
    State(state): State<AppState>,
    user: AuthUser,
    Path(post_id): Path<String>,
    Json(input): Json<PostInput>,
) -> AppResult<Response> {
    match state
        .post_service
        .edit_post(&user.viewer(), &post_id, input)
        .await
    {
        Ok(post) => Ok(found(&post_url(&post.id))),
        Err(AppError::Forbidden(_)) => Ok(found(&post_url(&post_id))),
        Err(e) => Err(e),
    }
}

/// Delete a post. Anyone but the author is sent back to the post.
async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    match state.post_service.delete_post(&user.viewer(), &post_id).await {
        Ok(_) => Ok(found(&profile_url(&user.0.username))),
        Err(AppError::Forbidden(_)) => Ok(found(&post_url(&post_id))),
        Err(e) => Err(e),
    }
}

/// Comment on a post, then go back to it.
async fn comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(post_id): Path<String>,
    Json(input): Json<CommentInput>,
) -> AppResult<Response> {
    state
        .comment_service
        .add_comment(&user.viewer(), &post_id, input)
        .await?;

    Ok(found(&post_url(&post_id)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/create/", post(create))
        .route("/posts/{post_id}/", get(detail))
        .route("/posts/{post_id}/edit/", post(edit))
        .route("/posts/{post_id}/delete/", post(delete))
        .route("/posts/{post_id}/comment/", post(comment))
}
