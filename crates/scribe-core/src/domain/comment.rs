use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comment left on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub text: String,
    pub is_publish: bool,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(user_id: Uuid, post_id: Uuid, text: String, is_publish: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            text,
            is_publish,
            post_id,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Public identity of a commenter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commenter {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// A comment joined with its author, as returned by listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentWithAuthor {
    pub comment: Comment,
    pub author: Option<Commenter>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub text: String,
    pub post_id: Uuid,
    pub is_publish: bool,
}
