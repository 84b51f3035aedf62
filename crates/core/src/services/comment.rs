//! Comment service.

use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::comment,
    repositories::{CommentRepository, PostRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::policy::{Viewer, can_comment, require_user};
use crate::services::post::validate_not_blank;

/// Maximum comment length in characters.
pub const MAX_COMMENT_CHARS: u64 = 200;

/// Input for adding a comment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentInput {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = MAX_COMMENT_CHARS)
    )]
    pub text: String,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(comment_repo: CommentRepository, post_repo: PostRepository) -> Self {
        Self {
            comment_repo,
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a comment by the viewer under a post.
    pub async fn add_comment(
        &self,
        viewer: &Viewer,
        post_id: &str,
        input: CommentInput,
    ) -> AppResult<comment::Model> {
        if !can_comment(viewer) {
            return Err(AppError::AuthRequired);
        }
        let author = require_user(viewer)?;
        let post = self.post_repo.get_by_id(post_id).await?;
        input.validate()?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post.id),
            user_id: Set(author.id.clone()),
            text: Set(input.text),
            created_at: Set(chrono::Utc::now().into()),
        };

        let comment = self.comment_repo.create(model).await?;
        tracing::info!(
            comment_id = %comment.id,
            post_id = %comment.post_id,
            user_id = %author.id,
            "Comment added"
        );

        Ok(comment)
    }
}
