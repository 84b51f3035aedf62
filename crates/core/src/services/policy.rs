//! Authorization policy.
//!
//! Every post and comment is publicly readable; only mutations are gated.
//! The `can_*` functions are pure decisions. The `require_*`/`ensure_*`
//! helpers turn a denial into the matching [`AppError`].

use quill_common::{AppError, AppResult};
use quill_db::entities::{post, user};

/// Who is looking at a page or attempting an action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Viewer {
    /// Not signed in.
    #[default]
    Anonymous,
    /// Signed in as this user.
    User(user::Model),
}

impl Viewer {
    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&user::Model> {
        match self {
            Self::Anonymous => None,
            Self::User(user) => Some(user),
        }
    }

    /// The signed-in user's ID, if any.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.user().map(|u| u.id.as_str())
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }
}

impl From<Option<user::Model>> for Viewer {
    fn from(user: Option<user::Model>) -> Self {
        user.map_or(Self::Anonymous, Self::User)
    }
}

impl From<user::Model> for Viewer {
    fn from(user: user::Model) -> Self {
        Self::User(user)
    }
}

/// Only the author may edit or delete a post.
#[must_use]
pub fn can_edit_post(viewer: &Viewer, post: &post::Model) -> bool {
    viewer.id() == Some(post.user_id.as_str())
}

#[must_use]
pub const fn can_create_post(viewer: &Viewer) -> bool {
    viewer.is_authenticated()
}

#[must_use]
pub const fn can_comment(viewer: &Viewer) -> bool {
    viewer.is_authenticated()
}

/// Signed-in users may follow anyone but themselves.
#[must_use]
pub fn can_follow(viewer: &Viewer, author: &user::Model) -> bool {
    viewer.id().is_some_and(|id| id != author.id)
}

/// A follow edge belongs to its subscriber, so any signed-in user may drop their own.
#[must_use]
pub const fn can_unfollow(viewer: &Viewer) -> bool {
    viewer.is_authenticated()
}

/// The signed-in user, or [`AppError::AuthRequired`].
pub fn require_user(viewer: &Viewer) -> AppResult<&user::Model> {
    viewer.user().ok_or(AppError::AuthRequired)
}

/// The signed-in admin, or [`AppError::AuthRequired`] / [`AppError::Forbidden`].
pub fn require_admin(viewer: &Viewer) -> AppResult<&user::Model> {
    let user = require_user(viewer)?;
    if user.is_admin {
        Ok(user)
    } else {
        Err(AppError::Forbidden("Admins only".to_string()))
    }
}

/// Fails with [`AppError::AuthRequired`] for anonymous viewers and
/// [`AppError::Forbidden`] for everyone but the post's author.
pub fn ensure_post_author(viewer: &Viewer, post: &post::Model) -> AppResult<()> {
    require_user(viewer)?;
    if can_edit_post(viewer, post) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Only the author can change post {}",
            post.id
        )))
    }
}
