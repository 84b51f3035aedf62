//! Follow edge repository.

use std::sync::Arc;

use crate::entities::{Following, following};
use quill_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Select, SqlErr,
};

/// Follow edges between subscribers and authors.
#[derive(Clone)]
pub struct FollowingRepository {
    db: Arc<DatabaseConnection>,
}

fn edge(user_id: &str, author_id: &str) -> Select<Following> {
    Following::find()
        .filter(following::Column::UserId.eq(user_id))
        .filter(following::Column::AuthorId.eq(author_id))
}

fn insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => AppError::Conflict(detail),
        _ => AppError::Database(err.to_string()),
    }
}

impl FollowingRepository {
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// The edge from `user_id` to `author_id`, if any.
    pub async fn find_by_pair(
        &self,
        user_id: &str,
        author_id: &str,
    ) -> AppResult<Option<following::Model>> {
        edge(user_id, author_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn is_following(&self, user_id: &str, author_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(user_id, author_id).await?.is_some())
    }

    /// Insert an edge. A pair that already exists fails with [`AppError::Conflict`].
    pub async fn create(&self, model: following::ActiveModel) -> AppResult<following::Model> {
        model.insert(self.db.as_ref()).await.map_err(insert_error)
    }

    /// Remove the edge for a pair. Returns the number of rows removed.
    pub async fn delete_by_pair(&self, user_id: &str, author_id: &str) -> AppResult<u64> {
        Following::delete_many()
            .filter(following::Column::UserId.eq(user_id))
            .filter(following::Column::AuthorId.eq(author_id))
            .exec(self.db.as_ref())
            .await
            .map(|result| result.rows_affected)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of subscribers an author has.
    pub async fn count_followers(&self, author_id: &str) -> AppResult<u64> {
        Following::find()
            .filter(following::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of authors a user subscribes to.
    pub async fn count_following(&self, user_id: &str) -> AppResult<u64> {
        Following::find()
            .filter(following::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
