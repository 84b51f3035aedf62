//! Authentication endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use quill_common::AppResult;
use quill_core::CreateUserInput;
use quill_db::entities::user;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, UserResponse, ok},
};

/// A signed-in session.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub user: UserResponse,
    /// Where to go after signing in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl SessionResponse {
    fn new(user: user::Model, next: Option<String>) -> Self {
        Self {
            token: user.token.clone().unwrap_or_default(),
            user: user.into(),
            next,
        }
    }
}

/// Query of the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// What the login form needs to know.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginFormResponse {
    pub next: String,
}

/// Signin request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

/// Only same-site paths are followed after signing in.
fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => "/".to_string(),
    }
}

/// Create a new user account.
async fn signup(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> AppResult<impl IntoResponse> {
    let user = state.user_service.create(input).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(SessionResponse::new(user, None)),
    ))
}

/// The login page: echoes where the viewer will land after signing in.
async fn login_form(Query(query): Query<LoginQuery>) -> ApiResponse<LoginFormResponse> {
    ApiResponse::ok(LoginFormResponse {
        next: safe_next(query.next.as_deref()),
    })
}

/// Sign in to an existing account.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let user = state
        .user_service
        .authenticate(&req.username, &req.password)
        .await?;
    let next = safe_next(req.next.as_deref());

    Ok(ApiResponse::ok(SessionResponse::new(user, Some(next))))
}

/// Sign out by rotating the account's token.
async fn logout(State(state): State<AppState>, user: AuthUser) -> AppResult<impl IntoResponse> {
    state.user_service.regenerate_token(&user.0.id).await?;

    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup/", post(signup))
        .route("/login/", get(login_form).post(login))
        .route("/logout/", post(logout))
}
