//! HTTP API layer for quill.
//!
//! - **Endpoints**: feeds, posts, comments, following, auth and admin
//! - **Extractors**: Authentication and pagination
//! - **Middleware**: Bearer-token authentication
//!
//! Built on Axum 0.8. Mutating endpoints answer with `302 Found` redirects,
//! reads answer with JSON.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::{Router, middleware::from_fn_with_state};
use quill_common::AppError;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};

/// The full application: routes, authentication and a JSON 404 fallback.
pub fn app(state: AppState) -> Router {
    router()
        .fallback(|| async { AppError::NotFound("No such page".to_string()) })
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
