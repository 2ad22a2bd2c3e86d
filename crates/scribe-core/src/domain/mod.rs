//! Domain entities - the core business objects.

mod comment;
mod post;
mod role;
mod tag;
mod user;

pub use comment::{Comment, CommentWithAuthor, Commenter, NewComment};
pub use post::{NewPost, Post, PostPatch};
pub use role::{ParseEnumError, Role, UserStatus};
pub use tag::{NewTag, Tag};
pub use user::{NewUser, User, UserPatch};
