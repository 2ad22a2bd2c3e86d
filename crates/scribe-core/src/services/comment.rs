use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Comment, CommentWithAuthor, NewComment};
use crate::error::{DomainError, DomainResult};
use crate::policy::{self, Action, Ownership};
use crate::ports::{BaseRepository, CommentRepository, PostRepository, TokenPayload};

/// Comment moderation: ADMIN comments skip the publish queue.
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { comments, posts }
    }

    pub async fn create(&self, caller: &TokenPayload, input: NewComment) -> DomainResult<Comment> {
        if self.posts.find_by_id(input.post_id).await?.is_none() {
            return Err(DomainError::not_found("Post not found"));
        }

        let is_publish = input.is_publish
            || policy::evaluate(Some(caller.role), Action::PublishOnCreate, Ownership::Owner)
                .is_allowed();
        let comment = Comment::new(caller.id, input.post_id, input.text, is_publish);

        let saved = self.comments.insert(comment).await?;
        tracing::debug!(comment_id = %saved.id, post_id = %saved.post_id, is_publish, "comment created");
        Ok(saved)
    }

    pub async fn delete(&self, id: Uuid) -> DomainResult<()> {
        Ok(self.comments.delete(id).await?)
    }

    pub async fn publish_comment(&self, id: Uuid) -> DomainResult<Comment> {
        Ok(self.comments.publish(id).await?)
    }

    pub async fn get_published_comments_by_post_id(
        &self,
        post_id: Uuid,
    ) -> DomainResult<Vec<CommentWithAuthor>> {
        Ok(self.comments.find_by_post(post_id, true).await?)
    }

    pub async fn get_unpublished_comments_by_post_id(
        &self,
        post_id: Uuid,
    ) -> DomainResult<Vec<CommentWithAuthor>> {
        Ok(self.comments.find_by_post(post_id, false).await?)
    }
}
