use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, CommentWithAuthor, Post, Tag, User, UserStatus};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// List every entity.
    async fn find_all(&self) -> Result<Vec<T>, RepoError>;

    /// Insert a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. Fails with `NotFound` if it is absent.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn update_status(&self, id: Uuid, status: UserStatus) -> Result<User, RepoError>;

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<User, RepoError>;
}

/// Post repository. Posts come back with their tags loaded.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_published(&self) -> Result<Vec<Post>, RepoError>;

    async fn find_published_by_tag(&self, tag_id: Uuid) -> Result<Vec<Post>, RepoError>;
}

/// Tag repository.
#[async_trait]
pub trait TagRepository: BaseRepository<Tag, Uuid> {
    async fn find_by_title(&self, title: &str) -> Result<Option<Tag>, RepoError>;

    /// Resolve ids to tags, silently skipping unknown ids.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Tag>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    async fn publish(&self, id: Uuid) -> Result<Comment, RepoError>;

    /// Comments of a post with the given publish state, joined with their authors.
    async fn find_by_post(
        &self,
        post_id: Uuid,
        is_publish: bool,
    ) -> Result<Vec<CommentWithAuthor>, RepoError>;
}
