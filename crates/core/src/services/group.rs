//! Group service.

use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{entities::group, repositories::GroupRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::services::policy::{Viewer, require_admin};

/// Input for creating a group.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 64), custom(function = "validate_slug"))]
    pub slug: String,

    #[serde(default)]
    pub description: String,
}

fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-'))
    {
        Ok(())
    } else {
        Err(ValidationError::new("slug_chars")
            .with_message("Use lowercase letters, digits, '_' or '-'".into()))
    }
}

/// Group service for business logic.
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
    id_gen: IdGenerator,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub const fn new(group_repo: GroupRepository) -> Self {
        Self {
            group_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a group by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<group::Model> {
        self.group_repo.get_by_slug(slug).await
    }

    /// All groups, ordered by title.
    pub async fn list(&self) -> AppResult<Vec<group::Model>> {
        self.group_repo.find_all().await
    }

    /// Create a group. Admins only.
    pub async fn create(&self, actor: &Viewer, input: CreateGroupInput) -> AppResult<group::Model> {
        require_admin(actor)?;
        input.validate()?;

        if self.group_repo.find_by_slug(&input.slug).await?.is_some() {
            return Err(AppError::Conflict(format!("Slug already in use: {}", input.slug)));
        }

        let model = group::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            slug: Set(input.slug),
            description: Set(input.description),
            created_at: Set(chrono::Utc::now().into()),
        };

        let group = self.group_repo.create(model).await?;
        tracing::info!(group_id = %group.id, slug = %group.slug, "Group created");

        Ok(group)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::TestContext;

    fn input(slug: &str) -> CreateGroupInput {
        CreateGroupInput {
            title: "Cats".to_string(),
            slug: slug.to_string(),
            description: "All about cats".to_string(),
        }
    }

    #[tokio::test]
    async fn test_admin_creates_group() {
        let ctx = TestContext::new().await;
        let admin = ctx.admin("root").await;

        let group = ctx.groups.create(&admin, input("cats")).await.unwrap();

        assert_eq!(ctx.groups.get_by_slug("cats").await.unwrap().id, group.id);
        assert_eq!(ctx.groups.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_non_admin_is_forbidden() {
        let ctx = TestContext::new().await;
        let leo = ctx.user("leo").await;

        let result = ctx.groups.create(&leo, input("cats")).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let result = ctx.groups.create(&Viewer::Anonymous, input("cats")).await;
        assert!(matches!(result, Err(AppError::AuthRequired)));
    }

    #[tokio::test]
    async fn test_bad_and_duplicate_slugs() {
        let ctx = TestContext::new().await;
        let admin = ctx.admin("root").await;

        let bad = ctx.groups.create(&admin, input("Big Cats")).await;
        assert!(matches!(bad, Err(AppError::Validation { field, .. }) if field == "slug"));

        ctx.groups.create(&admin, input("cats")).await.unwrap();
        let dup = ctx.groups.create(&admin, input("cats")).await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_unknown_slug_is_not_found() {
        let ctx = TestContext::new().await;
        let result = ctx.groups.get_by_slug("nope").await;
        assert!(matches!(result, Err(AppError::GroupNotFound(_))));
    }
}
