//! In-memory repositories, used when no `DATABASE_URL` is configured.
//!
//! Rows live in insertion order behind a `tokio` RwLock. Unique columns
//! (user email, tag title) are enforced on insert the way the database would.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use scribe_core::domain::{Comment, CommentWithAuthor, Commenter, Post, Tag, User, UserStatus};
use scribe_core::error::RepoError;
use scribe_core::ports::{
    BaseRepository, CommentRepository, PostRepository, TagRepository, UserRepository,
};

/// A row type that can live in a [`MemoryTable`].
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;

    /// Whether `self` and `other` collide on a unique column.
    fn conflicts_with(&self, _other: &Self) -> bool {
        false
    }
}

impl Record for User {
    fn id(&self) -> Uuid {
        self.id
    }

    fn conflicts_with(&self, other: &Self) -> bool {
        self.email == other.email
    }
}

impl Record for Tag {
    fn id(&self) -> Uuid {
        self.id
    }

    fn conflicts_with(&self, other: &Self) -> bool {
        self.title == other.title
    }
}

impl Record for Post {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Comment {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Generic in-memory table.
pub struct MemoryTable<T> {
    rows: RwLock<Vec<T>>,
}

impl<T> Default for MemoryTable<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }
}

impl<T: Record> MemoryTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    async fn select(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows
            .read()
            .await
            .iter()
            .filter(|r| pred(r))
            .cloned()
            .collect()
    }

    async fn modify(&self, id: Uuid, change: impl FnOnce(&mut T)) -> Result<T, RepoError> {
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or(RepoError::NotFound)?;
        change(row);
        Ok(row.clone())
    }
}

#[async_trait]
impl<T: Record> BaseRepository<T, Uuid> for MemoryTable<T> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        Ok(self.select(|r| r.id() == id).await.into_iter().next())
    }

    async fn find_all(&self) -> Result<Vec<T>, RepoError> {
        Ok(self.rows.read().await.clone())
    }

    async fn insert(&self, entity: T) -> Result<T, RepoError> {
        let mut rows = self.rows.write().await;
        if rows
            .iter()
            .any(|r| r.id() == entity.id() || r.conflicts_with(&entity))
        {
            return Err(RepoError::Constraint("duplicate key value".to_string()));
        }
        rows.push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<T, RepoError> {
        let mut rows = self.rows.write().await;
        if rows
            .iter()
            .any(|r| r.id() != entity.id() && r.conflicts_with(&entity))
        {
            return Err(RepoError::Constraint("duplicate key value".to_string()));
        }
        let slot = rows
            .iter_mut()
            .find(|r| r.id() == entity.id())
            .ok_or(RepoError::NotFound)?;
        *slot = entity.clone();
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|r| r.id() != id);
        if rows.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

pub type InMemoryUserRepository = MemoryTable<User>;
pub type InMemoryTagRepository = MemoryTable<Tag>;

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self.select(|u| u.email == email).await.into_iter().next())
    }

    async fn update_status(&self, id: Uuid, status: UserStatus) -> Result<User, RepoError> {
        self.modify(id, |u| {
            u.status = status;
            u.updated_at = Utc::now();
        })
        .await
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<User, RepoError> {
        self.modify(id, |u| {
            u.password_hash = password_hash.to_string();
            u.updated_at = Utc::now();
        })
        .await
    }
}

#[async_trait]
impl TagRepository for InMemoryTagRepository {
    async fn find_by_title(&self, title: &str) -> Result<Option<Tag>, RepoError> {
        Ok(self.select(|t| t.title == title).await.into_iter().next())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Tag>, RepoError> {
        Ok(self.select(|t| ids.contains(&t.id)).await)
    }
}

/// Posts whose tag list follows deletions in the tag table.
pub struct InMemoryPostRepository {
    posts: MemoryTable<Post>,
    tags: Arc<InMemoryTagRepository>,
}

impl InMemoryPostRepository {
    pub fn new(tags: Arc<InMemoryTagRepository>) -> Self {
        Self {
            posts: MemoryTable::new(),
            tags,
        }
    }

    async fn prune(&self, mut posts: Vec<Post>) -> Vec<Post> {
        let live = self.tags.rows.read().await;
        for post in &mut posts {
            post.tags.retain(|t| live.iter().any(|l| l.id == t.id));
        }
        posts
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let found = self.posts.find_by_id(id).await?;
        Ok(self.prune(found.into_iter().collect()).await.into_iter().next())
    }

    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        let all = self.posts.find_all().await?;
        Ok(self.prune(all).await)
    }

    async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
        self.posts.insert(entity).await
    }

    async fn update(&self, entity: Post) -> Result<Post, RepoError> {
        self.posts.update(entity).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.posts.delete(id).await
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_published(&self) -> Result<Vec<Post>, RepoError> {
        let published = self.posts.select(|p| p.is_publish).await;
        Ok(self.prune(published).await)
    }

    async fn find_published_by_tag(&self, tag_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let published = self.find_published().await?;
        Ok(published
            .into_iter()
            .filter(|p| p.tags.iter().any(|t| t.id == tag_id))
            .collect())
    }
}

/// Comments joined with their authors from the user table.
///
/// Comments of a deleted post are dropped, matching the cascade on `post_id`.
pub struct InMemoryCommentRepository {
    comments: MemoryTable<Comment>,
    users: Arc<InMemoryUserRepository>,
    posts: Arc<InMemoryPostRepository>,
}

impl InMemoryCommentRepository {
    pub fn new(users: Arc<InMemoryUserRepository>, posts: Arc<InMemoryPostRepository>) -> Self {
        Self {
            comments: MemoryTable::new(),
            users,
            posts,
        }
    }

    async fn prune(&self, mut comments: Vec<Comment>) -> Vec<Comment> {
        let live = self.posts.posts.rows.read().await;
        comments.retain(|c| live.iter().any(|p| p.id == c.post_id));
        comments
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let found = self.comments.find_by_id(id).await?;
        Ok(self.prune(found.into_iter().collect()).await.into_iter().next())
    }

    async fn find_all(&self) -> Result<Vec<Comment>, RepoError> {
        let all = self.comments.find_all().await?;
        Ok(self.prune(all).await)
    }

    async fn insert(&self, entity: Comment) -> Result<Comment, RepoError> {
        self.comments.insert(entity).await
    }

    async fn update(&self, entity: Comment) -> Result<Comment, RepoError> {
        self.comments.update(entity).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.comments.delete(id).await
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn publish(&self, id: Uuid) -> Result<Comment, RepoError> {
        if self.find_by_id(id).await?.is_none() {
            return Err(RepoError::NotFound);
        }
        self.comments
            .modify(id, |c| {
                c.is_publish = true;
                c.updated_at = Utc::now();
            })
            .await
    }

    async fn find_by_post(
        &self,
        post_id: Uuid,
        is_publish: bool,
    ) -> Result<Vec<CommentWithAuthor>, RepoError> {
        let selected = self
            .comments
            .select(|c| c.post_id == post_id && c.is_publish == is_publish)
            .await;
        let comments = self.prune(selected).await;
        let users = self.users.rows.read().await;

        Ok(comments
            .into_iter()
            .map(|comment| {
                let author = users
                    .iter()
                    .find(|u| u.id == comment.user_id)
                    .map(|u| Commenter {
                        id: u.id,
                        name: u.name.clone(),
                        email: u.email.clone(),
                    });
                CommentWithAuthor { comment, author }
            })
            .collect())
    }
}

/// The four in-memory repositories, wired to each other.
pub struct InMemoryStore {
    pub users: Arc<InMemoryUserRepository>,
    pub posts: Arc<InMemoryPostRepository>,
    pub tags: Arc<InMemoryTagRepository>,
    pub comments: Arc<InMemoryCommentRepository>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let tags = Arc::new(InMemoryTagRepository::new());
        let posts = Arc::new(InMemoryPostRepository::new(tags.clone()));
        Self {
            comments: Arc::new(InMemoryCommentRepository::new(users.clone(), posts.clone())),
            users,
            posts,
            tags,
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
