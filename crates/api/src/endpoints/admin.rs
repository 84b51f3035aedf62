//! Admin endpoints.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use quill_common::AppResult;
use quill_core::{CreateGroupInput, policy::require_admin};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, GroupResponse, ok},
};

/// Create a group.
async fn create_group(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateGroupInput>,
) -> AppResult<ApiResponse<GroupResponse>> {
    let group = state.group_service.create(&user.viewer(), input).await?;

    Ok(ApiResponse::ok(group.into()))
}

/// Drop the cached index page.
async fn clear_cache(State(state): State<AppState>, user: AuthUser) -> AppResult<impl IntoResponse> {
    require_admin(&user.viewer())?;
    state.index_cache.clear().await;

    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/groups/", post(create_group))
        .route("/cache/clear/", post(clear_cache))
}
