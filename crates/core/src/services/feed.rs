//! Feed composer.
//!
//! Builds the paginated, newest-first post listings: the global index, a
//! group, an author's profile and a viewer's follow feed. Every item comes
//! back hydrated with its author and group, loaded in one batch per page.

use std::collections::HashMap;

use quill_common::{AppError, AppResult};
use quill_db::{
    Page,
    entities::{comment, group, post, user},
    repositories::{
        CommentRepository, FollowingRepository, GroupRepository, PostFilter, PostRepository,
        UserRepository,
    },
};

use crate::services::policy::{Viewer, can_comment, can_edit_post, require_user};

/// A post with the entities it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostView {
    pub post: post::Model,
    pub author: user::Model,
    pub group: Option<group::Model>,
}

/// A comment with its author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentView {
    pub comment: comment::Model,
    pub author: user::Model,
}

/// A group and one page of its posts.
#[derive(Debug, Clone)]
pub struct GroupFeed {
    pub group: group::Model,
    pub page: Page<PostView>,
}

/// An author's profile page.
#[derive(Debug, Clone)]
pub struct ProfileFeed {
    pub author: user::Model,
    pub page: Page<PostView>,
    /// Whether the viewer follows this author.
    pub following: bool,
    pub posts_count: u64,
    pub followers_count: u64,
    pub following_count: u64,
}

/// A single post with its comments and what the viewer may do with it.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: PostView,
    pub comments: Vec<CommentView>,
    pub comments_count: u64,
    pub can_edit: bool,
    pub can_comment: bool,
}

/// Feed service for composing post listings.
#[derive(Clone)]
pub struct FeedService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    group_repo: GroupRepository,
    comment_repo: CommentRepository,
    following_repo: FollowingRepository,
    page_size: u64,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        group_repo: GroupRepository,
        comment_repo: CommentRepository,
        following_repo: FollowingRepository,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            group_repo,
            comment_repo,
            following_repo,
            page_size: quill_db::PAGE_SIZE,
        }
    }

    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Every post.
    pub async fn index(&self, page: Option<u64>) -> AppResult<Page<PostView>> {
        self.compose(PostFilter::All, page).await
    }

    /// Posts filed under the group with this slug.
    pub async fn group(&self, slug: &str, page: Option<u64>) -> AppResult<GroupFeed> {
        let group = self.group_repo.get_by_slug(slug).await?;
        let page = self.compose(PostFilter::Group(&group.id), page).await?;

        Ok(GroupFeed { group, page })
    }

    /// Posts written by the user with this username.
    pub async fn profile(
        &self,
        viewer: &Viewer,
        username: &str,
        page: Option<u64>,
    ) -> AppResult<ProfileFeed> {
        let author = self.user_repo.get_by_username(username).await?;
        let page = self.compose(PostFilter::Author(&author.id), page).await?;

        let following = match viewer.id() {
            Some(id) => self.following_repo.is_following(id, &author.id).await?,
            None => false,
        };
        let followers_count = self.following_repo.count_followers(&author.id).await?;
        let following_count = self.following_repo.count_following(&author.id).await?;

        Ok(ProfileFeed {
            posts_count: page.total_count,
            author,
            page,
            following,
            followers_count,
            following_count,
        })
    }

    /// Posts by everyone the viewer follows. Needs a signed-in viewer.
    pub async fn follow(&self, viewer: &Viewer, page: Option<u64>) -> AppResult<Page<PostView>> {
        let user = require_user(viewer)?;
        self.compose(PostFilter::FollowedBy(&user.id), page).await
    }

    /// A post, its comments (newest first) and the viewer's affordances.
    pub async fn post_detail(&self, viewer: &Viewer, post_id: &str) -> AppResult<PostDetail> {
        let post = self.post_repo.get_by_id(post_id).await?;
        let can_edit = can_edit_post(viewer, &post);

        let comments = self.comment_repo.find_by_post(&post.id).await?;
        let mut user_ids: Vec<String> = comments.iter().map(|c| c.user_id.clone()).collect();
        user_ids.push(post.user_id.clone());
        let authors = self.users_by_id(user_ids).await?;

        let comments: Vec<CommentView> = comments
            .into_iter()
            .filter_map(|comment| {
                let author = authors.get(&comment.user_id)?.clone();
                Some(CommentView { comment, author })
            })
            .collect();

        let groups = self.groups_by_id(post.group_id.iter().cloned().collect()).await?;
        let post = hydrate(post, &authors, &groups)
            .ok_or_else(|| AppError::Internal("Post author missing".to_string()))?;

        Ok(PostDetail {
            post,
            comments_count: comments.len() as u64,
            comments,
            can_edit,
            can_comment: can_comment(viewer),
        })
    }

    async fn compose(&self, filter: PostFilter<'_>, page: Option<u64>) -> AppResult<Page<PostView>> {
        let page = self.post_repo.paginate(filter, page, self.page_size).await?;

        let authors = self
            .users_by_id(page.items.iter().map(|p| p.user_id.clone()).collect())
            .await?;
        let groups = self
            .groups_by_id(page.items.iter().filter_map(|p| p.group_id.clone()).collect())
            .await?;

        let number = page.number;
        let num_pages = page.num_pages;
        let total_count = page.total_count;
        let items = page
            .items
            .into_iter()
            .filter_map(|post| hydrate(post, &authors, &groups))
            .collect();

        Ok(Page::new(items, number, num_pages, total_count))
    }

    async fn users_by_id(&self, mut ids: Vec<String>) -> AppResult<HashMap<String, user::Model>> {
        ids.sort_unstable();
        ids.dedup();
        let users = self.user_repo.find_by_ids(&ids).await?;
        Ok(users.into_iter().map(|u| (u.id.clone(), u)).collect())
    }

    async fn groups_by_id(
        &self,
        mut ids: Vec<String>,
    ) -> AppResult<HashMap<String, group::Model>> {
        ids.sort_unstable();
        ids.dedup();
        let groups = self.group_repo.find_by_ids(&ids).await?;
        Ok(groups.into_iter().map(|g| (g.id.clone(), g)).collect())
    }
}

fn hydrate(
    post: post::Model,
    authors: &HashMap<String, user::Model>,
    groups: &HashMap<String, group::Model>,
) -> Option<PostView> {
    let Some(author) = authors.get(&post.user_id).cloned() else {
        tracing::warn!(post_id = %post.id, user_id = %post.user_id, "Post author not found");
        return None;
    };
    let group = post.group_id.as_ref().and_then(|id| groups.get(id)).cloned();

    Some(PostView {
        post,
        author,
        group,
    })
}
