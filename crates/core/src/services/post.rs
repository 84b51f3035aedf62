//! Post service.

use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::post,
    repositories::{GroupRepository, PostRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::services::moderation::ModerationFilter;
use crate::services::policy::{Viewer, can_create_post, ensure_post_author, require_user};

/// Input for creating or editing a post.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PostInput {
    #[validate(custom(function = "validate_not_blank"))]
    pub text: String,

    /// Slug of the group to file the post under. Empty means none.
    #[serde(default)]
    pub group: Option<String>,

    /// Stored image path. On edit, `None` keeps the current image.
    #[validate(length(max = 1024))]
    #[serde(default)]
    pub image: Option<String>,

    /// On edit, drop the current image.
    #[serde(default)]
    pub clear_image: bool,
}

/// Rejects text that is empty once surrounding whitespace is dropped.
pub(crate) fn validate_not_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        Err(ValidationError::new("required").with_message("This field is required".into()))
    } else {
        Ok(())
    }
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    group_repo: GroupRepository,
    moderation: ModerationFilter,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        group_repo: GroupRepository,
        moderation: ModerationFilter,
    ) -> Self {
        Self {
            post_repo,
            group_repo,
            moderation,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a post by ID.
    pub async fn get_post(&self, id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(id).await
    }

    /// Create a post authored by the viewer.
    pub async fn create_post(&self, viewer: &Viewer, input: PostInput) -> AppResult<post::Model> {
        if !can_create_post(viewer) {
            return Err(AppError::AuthRequired);
        }
        let author = require_user(viewer)?;
        let group_id = self.check_input(&input).await?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(author.id.clone()),
            group_id: Set(group_id),
            text: Set(input.text),
            image: Set(input.image.filter(|i| !i.is_empty())),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let post = self.post_repo.create(model).await?;
        tracing::info!(post_id = %post.id, user_id = %author.id, summary = %post.summary(), "Post created");

        Ok(post)
    }

    /// Edit a post. Only its author may do this; the publication date never changes.
    pub async fn edit_post(
        &self,
        viewer: &Viewer,
        post_id: &str,
        input: PostInput,
    ) -> AppResult<post::Model> {
        require_user(viewer)?;
        let post = self.post_repo.get_by_id(post_id).await?;
        if let Err(e) = ensure_post_author(viewer, &post) {
            tracing::warn!(post_id = %post.id, viewer = ?viewer.id(), "Denied post edit");
            return Err(e);
        }

        let group_id = self.check_input(&input).await?;

        let mut active: post::ActiveModel = post.into();
        active.text = Set(input.text);
        active.group_id = Set(group_id);
        if input.clear_image {
            active.image = Set(None);
        } else if let Some(image) = input.image.filter(|i| !i.is_empty()) {
            active.image = Set(Some(image));
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let post = self.post_repo.update(active).await?;
        tracing::info!(post_id = %post.id, "Post edited");

        Ok(post)
    }

    /// Delete a post and its comments. Only its author may do this.
    pub async fn delete_post(&self, viewer: &Viewer, post_id: &str) -> AppResult<post::Model> {
        require_user(viewer)?;
        let post = self.post_repo.get_by_id(post_id).await?;
        if let Err(e) = ensure_post_author(viewer, &post) {
            tracing::warn!(post_id = %post.id, viewer = ?viewer.id(), "Denied post deletion");
            return Err(e);
        }

        self.post_repo.delete(&post.id).await?;
        tracing::info!(post_id = %post.id, "Post deleted");

        Ok(post)
    }

    /// Validate fields, run the banned-word check and resolve the group slug.
    async fn check_input(&self, input: &PostInput) -> AppResult<Option<String>> {
        input.validate()?;
        self.moderation.validate_post_text(&input.text)?;

        match input.group.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(slug) => self
                .group_repo
                .find_by_slug(slug)
                .await?
                .map(|g| Some(g.id))
                .ok_or_else(|| AppError::validation("group", format!("Unknown group: {slug}"))),
        }
    }
}
