//! Following service.

use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::{following, user},
    repositories::{FollowingRepository, UserRepository},
};
use sea_orm::Set;

use crate::services::policy::{Viewer, can_follow, can_unfollow, require_user};

/// Following service for business logic.
#[derive(Clone)]
pub struct FollowingService {
    following_repo: FollowingRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub const fn new(following_repo: FollowingRepository, user_repo: UserRepository) -> Self {
        Self {
            following_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow an author. Following someone twice returns the existing edge.
    ///
    /// Following yourself is [`AppError::Forbidden`].
    pub async fn follow(&self, viewer: &Viewer, username: &str) -> AppResult<following::Model> {
        let follower = require_user(viewer)?;
        let author = self.user_repo.get_by_username(username).await?;

        if !can_follow(viewer, &author) {
            tracing::warn!(user_id = %follower.id, "Denied self-follow");
            return Err(AppError::Forbidden("Cannot follow yourself".to_string()));
        }

        if let Some(existing) = self
            .following_repo
            .find_by_pair(&follower.id, &author.id)
            .await?
        {
            return Ok(existing);
        }

        let model = following::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(follower.id.clone()),
            author_id: Set(author.id.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let edge = match self.following_repo.create(model).await {
            Ok(edge) => edge,
            // A concurrent follow inserted the same pair first.
            Err(AppError::Conflict(_)) => {
                return self
                    .following_repo
                    .find_by_pair(&follower.id, &author.id)
                    .await?
                    .ok_or_else(|| AppError::Internal("Follow edge vanished".to_string()));
            }
            Err(e) => return Err(e),
        };
        tracing::info!(
            user_id = %follower.id,
            author_id = %author.id,
            "{}",
            describe(follower, &author)
        );

        Ok(edge)
    }

    /// Unfollow an author. Returns whether an edge was removed.
    pub async fn unfollow(&self, viewer: &Viewer, username: &str) -> AppResult<bool> {
        if !can_unfollow(viewer) {
            return Err(AppError::AuthRequired);
        }
        let follower = require_user(viewer)?;
        let author = self.user_repo.get_by_username(username).await?;

        let removed = self
            .following_repo
            .delete_by_pair(&follower.id, &author.id)
            .await?;
        if removed > 0 {
            tracing::info!(user_id = %follower.id, author_id = %author.id, "Unfollowed");
        }

        Ok(removed > 0)
    }
}

/// Human-readable form of a follow edge.
#[must_use]
pub fn describe(follower: &user::Model, author: &user::Model) -> String {
    format!("{} follows {}", follower.username, author.username)
}
