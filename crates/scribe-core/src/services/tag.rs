use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{NewTag, Tag};
use crate::error::{DomainError, DomainResult};
use crate::ports::{BaseRepository, TagRepository};

pub struct TagService {
    tags: Arc<dyn TagRepository>,
}

impl TagService {
    pub fn new(tags: Arc<dyn TagRepository>) -> Self {
        Self { tags }
    }

    pub async fn get_tags(&self) -> DomainResult<Vec<Tag>> {
        Ok(self.tags.find_all().await?)
    }

    /// Create a tag. Titles are unique.
    pub async fn create_tag(&self, input: NewTag) -> DomainResult<Tag> {
        if self.tags.find_by_title(&input.title).await?.is_some() {
            return Err(DomainError::Conflict("Tag already exists".to_string()));
        }

        let tag = self.tags.insert(Tag::new(input.title)).await?;
        tracing::info!(tag_id = %tag.id, title = %tag.title, "tag created");
        Ok(tag)
    }

    pub async fn get_tag_by_id(&self, id: Uuid) -> DomainResult<Tag> {
        self.tags
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Tag not found"))
    }

    pub async fn delete_tag_by_id(&self, id: Uuid) -> DomainResult<()> {
        Ok(self.tags.delete(id).await?)
    }
}
