//! Database entities.

pub mod comment;
pub mod following;
pub mod group;
pub mod post;
pub mod user;

pub use comment::Entity as Comment;
pub use following::Entity as Following;
pub use group::Entity as Group;
pub use post::Entity as Post;
pub use user::Entity as User;
