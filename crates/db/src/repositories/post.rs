//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, following, post};
use crate::pagination::{Page, num_pages, resolve_page_number};
use quill_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, sea_query::Query,
};

/// Which posts a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter<'a> {
    /// Every post.
    All,
    /// Posts filed under a group.
    Group(&'a str),
    /// Posts written by a user.
    Author(&'a str),
    /// Posts written by anyone the given user follows.
    FollowedBy(&'a str),
}

impl PostFilter<'_> {
    fn apply(self, query: Select<Post>) -> Select<Post> {
        match self {
            Self::All => query,
            Self::Group(group_id) => query.filter(post::Column::GroupId.eq(group_id)),
            Self::Author(user_id) => query.filter(post::Column::UserId.eq(user_id)),
            Self::FollowedBy(user_id) => query.filter(
                post::Column::UserId.in_subquery(
                    Query::select()
                        .column(following::Column::AuthorId)
                        .from(following::Entity)
                        .and_where(following::Column::UserId.eq(user_id))
                        .to_owned(),
                ),
            ),
        }
    }
}

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Count posts matching a filter.
    pub async fn count(&self, filter: PostFilter<'_>) -> AppResult<u64> {
        filter
            .apply(Post::find())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch one page of posts matching a filter, newest first.
    ///
    /// The requested page number is clamped into `1..=num_pages`.
    pub async fn paginate(
        &self,
        filter: PostFilter<'_>,
        page: Option<u64>,
        page_size: u64,
    ) -> AppResult<Page<post::Model>> {
        let total = self.count(filter).await?;
        let num_pages = num_pages(total, page_size);
        let number = resolve_page_number(page, num_pages);

        let items = filter
            .apply(Post::find())
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .offset((number - 1) * page_size)
            .limit(page_size)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Page::new(items, number, num_pages, total))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post. Its comments go with it.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
