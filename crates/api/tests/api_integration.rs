//! API integration tests.
//!
//! These tests drive the full router against an in-memory database.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use std::time::Duration;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{Request, StatusCode, header},
};
use quill_api::{app, middleware::AppState};
use quill_core::{
    CommentService, FeedService, FollowingService, GroupService, ModerationFilter, PageCache,
    PostService, UserService,
};
use quill_db::{
    repositories::{
        CommentRepository, FollowingRepository, GroupRepository, PostRepository, UserRepository,
    },
    test_utils::TestDatabase,
};
use serde_json::{Value, json};
use tower::ServiceExt;

struct TestApp {
    router: Router,
}

struct TestResponse {
    status: StatusCode,
    location: Option<String>,
    body: Bytes,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

impl TestApp {
    async fn new() -> Self {
        let db = TestDatabase::in_memory().await.unwrap().into_shared();

        let user_repo = UserRepository::new(db.clone());
        let group_repo = GroupRepository::new(db.clone());
        let post_repo = PostRepository::new(db.clone());
        let comment_repo = CommentRepository::new(db.clone());
        let following_repo = FollowingRepository::new(db.clone());
        let moderation = ModerationFilter::new(["мат", "война"]).unwrap();

        let state = AppState {
            user_service: UserService::new(user_repo.clone())
                .with_admin_usernames(vec!["root".to_string()]),
            group_service: GroupService::new(group_repo.clone()),
            post_service: PostService::new(post_repo.clone(), group_repo.clone(), moderation),
            comment_service: CommentService::new(comment_repo.clone(), post_repo.clone()),
            following_service: FollowingService::new(following_repo.clone(), user_repo.clone()),
            feed_service: FeedService::new(
                post_repo,
                user_repo,
                group_repo,
                comment_repo,
                following_repo,
            ),
            index_cache: PageCache::new(Duration::from_secs(60)),
        };

        Self { router: app(state) }
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            location,
            body,
        }
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send("GET", uri, token, None).await
    }

    async fn post(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.send("POST", uri, Some(token), Some(body)).await
    }

    /// Sign up and return the session token.
    async fn signup(&self, username: &str) -> String {
        let response = self
            .send(
                "POST",
                "/auth/signup/",
                None,
                Some(json!({ "username": username, "password": "password123" })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);

        response.json()["data"]["token"].as_str().unwrap().to_string()
    }

    async fn publish(&self, token: &str, text: &str) {
        let response = self.post("/create/", token, json!({ "text": text })).await;
        assert_eq!(response.status, StatusCode::FOUND);
    }

    /// ID of the newest post on a profile.
    async fn latest_post_id(&self, username: &str) -> String {
        let profile = self.get(&format!("/profile/{username}/"), None).await.json();
        profile["data"]["page"]["items"][0]["id"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

#[tokio::test]
async fn test_anonymous_mutations_redirect_to_login() {
    let app = TestApp::new().await;

    let create = app
        .send("POST", "/create/", None, Some(json!({ "text": "hi" })))
        .await;
    assert_eq!(create.status, StatusCode::FOUND);
    assert_eq!(
        create.location.as_deref(),
        Some("/auth/login/?next=%2Fcreate%2F")
    );

    let feed = app.get("/follow/?page=2", None).await;
    assert_eq!(feed.status, StatusCode::FOUND);
    assert_eq!(
        feed.location.as_deref(),
        Some("/auth/login/?next=%2Ffollow%2F%3Fpage%3D2")
    );
}

#[tokio::test]
async fn test_unknown_entities_are_not_found() {
    let app = TestApp::new().await;

    assert_eq!(app.get("/posts/nope/", None).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/group/nope/", None).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/profile/ghost/", None).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/no/such/route/", None).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_post_redirects_to_profile() {
    let app = TestApp::new().await;
    let token = app.signup("leo").await;

    let response = app.post("/create/", &token, json!({ "text": "Hello" })).await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location.as_deref(), Some("/profile/leo/"));

    let profile = app.get("/profile/leo/", None).await.json();
    assert_eq!(profile["data"]["postsCount"], 1);
    assert_eq!(profile["data"]["page"]["items"][0]["text"], "Hello");
    assert_eq!(profile["data"]["page"]["items"][0]["author"]["username"], "leo");
}

#[tokio::test]
async fn test_banned_word_is_rejected() {
    let app = TestApp::new().await;
    let token = app.signup("leo").await;

    let response = app
        .post("/create/", &token, json!({ "text": "Это война" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"]["field"], "text");

    let profile = app.get("/profile/leo/", None).await.json();
    assert_eq!(profile["data"]["postsCount"], 0);
}

#[tokio::test]
async fn test_non_author_edit_redirects_to_post() {
    let app = TestApp::new().await;
    let leo = app.signup("leo").await;
    let anna = app.signup("anna").await;
    app.publish(&leo, "Original").await;
    let post_id = app.latest_post_id("leo").await;

    let edit = app
        .post(
            &format!("/posts/{post_id}/edit/"),
            &anna,
            json!({ "text": "Hijacked" }),
        )
        .await;
    assert_eq!(edit.status, StatusCode::FOUND);
    assert_eq!(edit.location, Some(format!("/posts/{post_id}/")));

    let delete = app
        .post(&format!("/posts/{post_id}/delete/"), &anna, json!({}))
        .await;
    assert_eq!(delete.status, StatusCode::FOUND);
    assert_eq!(delete.location, Some(format!("/posts/{post_id}/")));

    let detail = app.get(&format!("/posts/{post_id}/"), Some(&anna)).await.json();
    assert_eq!(detail["data"]["post"]["text"], "Original");
    assert_eq!(detail["data"]["canEdit"], false);
    assert_eq!(detail["data"]["canComment"], true);
}

#[tokio::test]
async fn test_author_edit_and_comment() {
    let app = TestApp::new().await;
    let leo = app.signup("leo").await;
    let anna = app.signup("anna").await;
    app.publish(&leo, "Draft").await;
    let post_id = app.latest_post_id("leo").await;

    let edit = app
        .post(&format!("/posts/{post_id}/edit/"), &leo, json!({ "text": "Final" }))
        .await;
    assert_eq!(edit.status, StatusCode::FOUND);
    assert_eq!(edit.location, Some(format!("/posts/{post_id}/")));

    let comment = app
        .post(
            &format!("/posts/{post_id}/comment/"),
            &anna,
            json!({ "text": "Nice" }),
        )
        .await;
    assert_eq!(comment.status, StatusCode::FOUND);
    assert_eq!(comment.location, Some(format!("/posts/{post_id}/")));

    let detail = app.get(&format!("/posts/{post_id}/"), Some(&leo)).await.json();
    assert_eq!(detail["data"]["post"]["text"], "Final");
    assert_eq!(detail["data"]["canEdit"], true);
    assert_eq!(detail["data"]["commentsCount"], 1);
    assert_eq!(detail["data"]["comments"][0]["author"]["username"], "anna");

    let anonymous = app.get(&format!("/posts/{post_id}/"), None).await.json();
    assert_eq!(anonymous["data"]["canComment"], false);
}

#[tokio::test]
async fn test_follow_feed_shows_followed_authors() {
    let app = TestApp::new().await;
    let reader = app.signup("reader").await;
    let author = app.signup("author").await;
    let stranger = app.signup("stranger").await;

    let follow = app
        .post("/profile/author/follow/", &reader, json!({}))
        .await;
    assert_eq!(follow.status, StatusCode::FOUND);
    assert_eq!(follow.location.as_deref(), Some("/profile/author/"));

    app.publish(&author, "News").await;
    app.publish(&stranger, "Noise").await;

    let feed = app.get("/follow/", Some(&reader)).await;
    assert_eq!(feed.status, StatusCode::OK);
    let feed = feed.json();
    assert_eq!(feed["data"]["totalCount"], 1);
    assert_eq!(feed["data"]["items"][0]["text"], "News");

    let self_follow = app.post("/profile/reader/follow/", &reader, json!({})).await;
    assert_eq!(self_follow.status, StatusCode::FOUND);
    assert_eq!(self_follow.location.as_deref(), Some("/profile/reader/"));
    let own_profile = app.get("/profile/reader/", Some(&reader)).await.json();
    assert_eq!(own_profile["data"]["following"], false);
    assert_eq!(own_profile["data"]["followersCount"], 0);

    let unfollow = app
        .post("/profile/author/unfollow/", &reader, json!({}))
        .await;
    assert_eq!(unfollow.status, StatusCode::FOUND);
    let feed = app.get("/follow/", Some(&reader)).await.json();
    assert_eq!(feed["data"]["totalCount"], 0);
}

#[tokio::test]
async fn test_index_first_page_is_cached_until_cleared() {
    let app = TestApp::new().await;
    let root = app.signup("root").await;
    let leo = app.signup("leo").await;
    app.publish(&leo, "First").await;

    let before = app.get("/", None).await;
    assert_eq!(before.status, StatusCode::OK);
    assert_eq!(before.json()["data"]["totalCount"], 1);

    app.publish(&leo, "Second").await;

    let cached = app.get("/", None).await;
    assert_eq!(cached.body, before.body);

    let forbidden = app.post("/admin/cache/clear/", &leo, json!({})).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let cleared = app.post("/admin/cache/clear/", &root, json!({})).await;
    assert_eq!(cleared.status, StatusCode::NO_CONTENT);

    let fresh = app.get("/", None).await;
    assert_ne!(fresh.body, before.body);
    assert_eq!(fresh.json()["data"]["totalCount"], 2);
}

#[tokio::test]
async fn test_group_feed_and_admin_group_creation() {
    let app = TestApp::new().await;
    let root = app.signup("root").await;
    let leo = app.signup("leo").await;

    let denied = app
        .post("/admin/groups/", &leo, json!({ "title": "Cats", "slug": "cats" }))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let created = app
        .post("/admin/groups/", &root, json!({ "title": "Cats", "slug": "cats" }))
        .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.json()["data"]["slug"], "cats");

    app.post("/create/", &leo, json!({ "text": "Meow", "group": "cats" }))
        .await;
    app.publish(&leo, "Elsewhere").await;

    let feed = app.get("/group/cats/?page=abc", None).await;
    assert_eq!(feed.status, StatusCode::OK);
    let feed = feed.json();
    assert_eq!(feed["data"]["group"]["title"], "Cats");
    assert_eq!(feed["data"]["page"]["number"], 1);
    assert_eq!(feed["data"]["page"]["totalCount"], 1);
    assert_eq!(feed["data"]["page"]["items"][0]["group"]["slug"], "cats");

    let groups = app.get("/groups/", None).await.json();
    assert_eq!(groups["data"][0]["slug"], "cats");
}

#[tokio::test]
async fn test_group_feed_page_query() {
    let app = TestApp::new().await;
    let root = app.signup("root").await;
    let leo = app.signup("leo").await;
    app.post("/admin/groups/", &root, json!({ "title": "Cats", "slug": "cats" }))
        .await;
    for i in 0..15 {
        let response = app
            .post("/create/", &leo, json!({ "text": format!("cat {i}"), "group": "cats" }))
            .await;
        assert_eq!(response.status, StatusCode::FOUND);
    }

    let first = app.get("/group/cats/", None).await.json();
    assert_eq!(first["data"]["page"]["number"], 1);
    assert_eq!(first["data"]["page"]["items"].as_array().unwrap().len(), 10);
    assert_eq!(first["data"]["page"]["hasNext"], true);

    let second = app.get("/group/cats/?page=2", None).await.json();
    assert_eq!(second["data"]["page"]["number"], 2);
    assert_eq!(second["data"]["page"]["items"].as_array().unwrap().len(), 5);
    assert_eq!(second["data"]["page"]["hasNext"], false);
    assert_eq!(second["data"]["page"]["hasPrevious"], true);

    let encoded = app.get("/group/cats/?page=%32", None).await;
    assert_eq!(encoded.status, StatusCode::OK);
    assert_eq!(encoded.body, app.get("/group/cats/?page=2", None).await.body);

    let clamped = app.get("/group/cats/?page=99", None).await.json();
    assert_eq!(clamped["data"]["page"]["number"], 2);
    assert_eq!(clamped["data"]["page"]["numPages"], 2);
    assert_eq!(clamped["data"]["page"]["items"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_login_and_logout() {
    let app = TestApp::new().await;
    let first = app.signup("leo").await;

    let form = app.get("/auth/login/?next=%2Ffollow%2F", None).await.json();
    assert_eq!(form["data"]["next"], "/follow/");

    let login = app
        .send(
            "POST",
            "/auth/login/",
            None,
            Some(json!({ "username": "LEO", "password": "password123", "next": "/follow/" })),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    let login = login.json();
    assert_eq!(login["data"]["token"], first.as_str());
    assert_eq!(login["data"]["next"], "/follow/");

    let wrong = app
        .send(
            "POST",
            "/auth/login/",
            None,
            Some(json!({ "username": "leo", "password": "nope-nope" })),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let logout = app.post("/auth/logout/", &first, json!({})).await;
    assert_eq!(logout.status, StatusCode::NO_CONTENT);

    let stale = app.get("/follow/", Some(&first)).await;
    assert_eq!(stale.status, StatusCode::FOUND);
}
