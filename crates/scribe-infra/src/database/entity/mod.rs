//! SeaORM entities. Each maps a table onto a domain type.

pub mod comment;
pub mod post;
pub mod post_tag;
pub mod tag;
pub mod user;
