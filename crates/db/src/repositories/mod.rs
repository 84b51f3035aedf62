//! Repository layer for database operations.

mod comment;
mod following;
mod group;
mod post;
mod user;

pub use comment::CommentRepository;
pub use following::FollowingRepository;
pub use group::GroupRepository;
pub use post::{PostFilter, PostRepository};
pub use user::UserRepository;
