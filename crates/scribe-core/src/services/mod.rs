//! Domain services - business rules layered over the ports.
//!
//! Services are constructed once at startup and shared behind `Arc`.
//! They hold no mutable state of their own.

mod auth;
mod comment;
mod posts;
mod tag;
mod user;

#[cfg(test)]
mod testing;

pub use auth::{AuthService, IssuedToken};
pub use comment::CommentService;
pub use posts::PostService;
pub use tag::TagService;
pub use user::UserService;
