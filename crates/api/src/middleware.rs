//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use quill_core::{
    CommentService, FeedService, FollowingService, GroupService, PageCache, PostService,
    UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub group_service: GroupService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub following_service: FollowingService,
    pub feed_service: FeedService,
    /// Serialized first page of the index feed.
    pub index_cache: PageCache<Bytes>,
}

/// Authentication middleware.
///
/// Resolves `Authorization: Bearer <token>` into a `user::Model` request
/// extension. Unknown tokens leave the request anonymous.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.user_service.authenticate_by_token(token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => tracing::debug!(error = %e, "Ignoring unknown bearer token"),
        }
    }

    next.run(req).await
}
