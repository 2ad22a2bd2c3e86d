use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Tag;

/// Post entity - a blog article with its attached tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub text: String,
    pub views_count: i32,
    pub is_publish: bool,
    pub tags: Vec<Tag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post owned by `user_id`.
    pub fn new(user_id: Uuid, title: String, text: String, is_publish: bool, tags: Vec<Tag>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            text,
            views_count: 0,
            is_publish,
            tags,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn tag_ids(&self) -> Vec<Uuid> {
        self.tags.iter().map(|t| t.id).collect()
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub text: String,
    pub tag_ids: Vec<Uuid>,
}

/// Partial update of a post. `tag_ids` connects additional tags.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub text: Option<String>,
    pub tag_ids: Option<Vec<Uuid>>,
    pub is_publish: Option<bool>,
}
