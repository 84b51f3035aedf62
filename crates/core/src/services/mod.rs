//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod feed;
pub mod following;
pub mod group;
pub mod moderation;
pub mod page_cache;
pub mod policy;
pub mod post;
pub mod user;

pub use comment::{CommentInput, CommentService};
pub use feed::{CommentView, FeedService, GroupFeed, PostDetail, PostView, ProfileFeed};
pub use following::FollowingService;
pub use group::{CreateGroupInput, GroupService};
pub use moderation::{ModerationFilter, ModerationResult};
pub use page_cache::PageCache;
pub use policy::Viewer;
pub use post::{PostInput, PostService};
pub use user::{CreateUserInput, UserService};
