//! Request extractors.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use quill_core::Viewer;
use quill_db::entities::user;
use serde::Deserialize;

use crate::response::found;

/// Where anonymous viewers are sent to sign in.
pub const LOGIN_PATH: &str = "/auth/login/";

/// Login URL that brings the viewer back to `destination` afterwards.
#[must_use]
pub fn login_redirect_url(destination: &str) -> String {
    format!("{LOGIN_PATH}?next={}", urlencoding::encode(destination))
}

/// Rejection for [`AuthUser`]: a redirect to the login page.
#[derive(Debug)]
pub struct LoginRedirect(pub String);

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        found(&login_redirect_url(&self.0))
    }
}

/// Authenticated user extractor.
///
/// Anonymous requests are redirected to the login page, carrying the
/// original path and query.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl AuthUser {
    /// The user as a policy [`Viewer`].
    #[must_use]
    pub fn viewer(&self) -> Viewer {
        Viewer::User(self.0.clone())
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = LoginRedirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get user from request extensions (set by auth middleware)
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                let destination = parts
                    .uri
                    .path_and_query()
                    .map_or_else(|| parts.uri.path().to_string(), ToString::to_string);
                LoginRedirect(destination)
            })
    }
}

/// Optional authenticated user extractor.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl MaybeAuthUser {
    /// Anonymous when no token was presented.
    #[must_use]
    pub fn viewer(&self) -> Viewer {
        Viewer::from(self.0.clone())
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<user::Model>().cloned()))
    }
}

/// Query string of paginated listings.
///
/// The page is kept as text so that a non-numeric value means "first page"
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<String>,
}

impl PageQuery {
    /// The requested page number, if it parses as one.
    #[must_use]
    pub fn number(&self) -> Option<u64> {
        self.page.as_deref().and_then(|s| s.trim().parse().ok())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{
        extract::Query,
        http::{Request, Uri},
    };

    fn page_number(uri: &'static str) -> Option<u64> {
        let Query(query) = Query::<PageQuery>::try_from_uri(&Uri::from_static(uri)).unwrap();
        query.number()
    }

    #[test]
    fn test_page_query() {
        assert_eq!(page_number("/"), None);
        assert_eq!(page_number("/?page=2"), Some(2));
        assert_eq!(page_number("/?x=1&page=3"), Some(3));
        assert_eq!(page_number("/?page="), None);
        assert_eq!(page_number("/?page=abc"), None);
        assert_eq!(page_number("/?page=-1"), None);
    }

    #[test]
    fn test_page_query_is_percent_decoded() {
        assert_eq!(page_number("/?page=%32"), Some(2));
        assert_eq!(page_number("/?pa%67e=4"), Some(4));
        assert_eq!(page_number("/?page=1%30"), Some(10));
    }

    #[tokio::test]
    async fn test_anonymous_auth_user_redirects_with_next() {
        let (mut parts, ()) = Request::builder()
            .uri("/follow/?page=2")
            .body(())
            .unwrap()
            .into_parts();

        let rejection = AuthUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(rejection.0, "/follow/?page=2");
        assert_eq!(
            login_redirect_url(&rejection.0),
            "/auth/login/?next=%2Ffollow%2F%3Fpage%3D2"
        );
    }
}
