//! Service wiring over a fresh in-memory database, for tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use quill_common::IdGenerator;
use quill_db::{
    entities::{comment, group, post},
    repositories::{
        CommentRepository, FollowingRepository, GroupRepository, PostRepository, UserRepository,
    },
    test_utils::TestDatabase,
};
use sea_orm::Set;

use crate::services::{
    CommentService, CreateUserInput, FeedService, FollowingService, GroupService,
    ModerationFilter, PostInput, PostService, UserService, Viewer,
};

pub struct TestContext {
    pub users: UserService,
    pub groups: GroupService,
    pub posts: PostService,
    pub comments: CommentService,
    pub following: FollowingService,
    pub feed: FeedService,
    pub post_repo: PostRepository,
    group_repo: GroupRepository,
    comment_repo: CommentRepository,
    id_gen: IdGenerator,
}

/// A fixed instant plus `minute` minutes, for tests that depend on ordering.
pub fn at(minute: i64) -> DateTime<FixedOffset> {
    (Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minute)).into()
}

impl TestContext {
    pub async fn new() -> Self {
        let db = TestDatabase::in_memory().await.unwrap().into_shared();
        Self::with_db(db)
    }

    pub fn with_db(db: Arc<sea_orm::DatabaseConnection>) -> Self {
        let user_repo = UserRepository::new(db.clone());
        let group_repo = GroupRepository::new(db.clone());
        let post_repo = PostRepository::new(db.clone());
        let comment_repo = CommentRepository::new(db.clone());
        let following_repo = FollowingRepository::new(db);
        let moderation = ModerationFilter::new(["мат", "война"]).unwrap();

        Self {
            users: UserService::new(user_repo.clone()),
            groups: GroupService::new(group_repo.clone()),
            posts: PostService::new(post_repo.clone(), group_repo.clone(), moderation),
            comments: CommentService::new(comment_repo.clone(), post_repo.clone()),
            following: FollowingService::new(following_repo.clone(), user_repo.clone()),
            feed: FeedService::new(
                post_repo.clone(),
                user_repo,
                group_repo.clone(),
                comment_repo.clone(),
                following_repo,
            ),
            post_repo,
            group_repo,
            comment_repo,
            id_gen: IdGenerator::new(),
        }
    }

    fn signup(username: &str) -> CreateUserInput {
        CreateUserInput {
            username: username.to_string(),
            password: "password123".to_string(),
            name: None,
        }
    }

    /// Sign up a regular user.
    pub async fn user(&self, username: &str) -> Viewer {
        Viewer::User(self.users.create(Self::signup(username)).await.unwrap())
    }

    /// Sign up an admin.
    pub async fn admin(&self, username: &str) -> Viewer {
        let users = self
            .users
            .clone()
            .with_admin_usernames(vec![username.to_string()]);
        Viewer::User(users.create(Self::signup(username)).await.unwrap())
    }

    pub async fn group(&self, slug: &str) -> group::Model {
        self.group_repo
            .create(group::ActiveModel {
                id: Set(self.id_gen.generate()),
                title: Set(slug.to_uppercase()),
                slug: Set(slug.to_string()),
                description: Set(String::new()),
                created_at: Set(at(0)),
            })
            .await
            .unwrap()
    }

    /// Publish through the post service.
    pub async fn post(&self, author: &Viewer, text: &str) -> post::Model {
        self.posts
            .create_post(
                author,
                PostInput {
                    text: text.to_string(),
                    ..PostInput::default()
                },
            )
            .await
            .unwrap()
    }

    /// Insert a post with a fixed publication date.
    pub async fn post_at(
        &self,
        author: &Viewer,
        text: &str,
        group_slug: Option<&str>,
        minute: i64,
    ) -> post::Model {
        let group_id = match group_slug {
            Some(slug) => Some(self.group_repo.get_by_slug(slug).await.unwrap().id),
            None => None,
        };

        self.post_repo
            .create(post::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(author.id().unwrap().to_string()),
                group_id: Set(group_id),
                text: Set(text.to_string()),
                image: Set(None),
                created_at: Set(at(minute)),
                updated_at: Set(None),
            })
            .await
            .unwrap()
    }

    /// Insert a comment with a fixed creation date.
    pub async fn comment_at(
        &self,
        author: &Viewer,
        post_id: &str,
        text: &str,
        minute: i64,
    ) -> comment::Model {
        self.comment_repo
            .create(comment::ActiveModel {
                id: Set(self.id_gen.generate()),
                post_id: Set(post_id.to_string()),
                user_id: Set(author.id().unwrap().to_string()),
                text: Set(text.to_string()),
                created_at: Set(at(minute)),
            })
            .await
            .unwrap()
    }
}
