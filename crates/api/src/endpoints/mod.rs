//! API endpoints.

mod admin;
mod auth;
mod following;
mod groups;
mod posts;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(posts::router())
        .merge(groups::router())
        .merge(users::router())
        .merge(following::router())
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
}

/// Detail page of a post.
pub(crate) fn post_url(post_id: &str) -> String {
    format!("/posts/{post_id}/")
}

/// Profile page of a user.
pub(crate) fn profile_url(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}
