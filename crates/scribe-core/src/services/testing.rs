//! Test doubles for the ports.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, CommentWithAuthor, Post, Tag, User, UserStatus};
use crate::error::RepoError;
use crate::ports::{
    AuthError, BaseRepository, CommentRepository, MailError, Mailer, PasswordService,
    PostRepository, TagRepository, TokenClaims, TokenKind, TokenPayload, TokenService,
    UserRepository,
};

pub trait Keyed {
    fn key(&self) -> Uuid;
}

impl Keyed for User {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for Post {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for Tag {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for Comment {
    fn key(&self) -> Uuid {
        self.id
    }
}

/// A vector behind a mutex, standing in for a table.
pub struct Table<T> {
    rows: Mutex<Vec<T>>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
        }
    }
}

impl<T: Clone> Table<T> {
    pub fn rows(&self) -> Vec<T> {
        self.rows.lock().unwrap().clone()
    }

    fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.lock().unwrap().iter().filter(|r| pred(r)).cloned().collect()
    }
}

#[async_trait]
impl<T> BaseRepository<T, Uuid> for Table<T>
where
    T: Keyed + Clone + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        Ok(self.filter(|r| r.key() == id).into_iter().next())
    }

    async fn find_all(&self) -> Result<Vec<T>, RepoError> {
        Ok(self.rows())
    }

    async fn insert(&self, entity: T) -> Result<T, RepoError> {
        self.rows.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<T, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let slot = rows
            .iter_mut()
            .find(|r| r.key() == entity.key())
            .ok_or(RepoError::NotFound)?;
        *slot = entity.clone();
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.key() != id);
        if rows.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for Table<User> {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self.filter(|u| u.email == email).into_iter().next())
    }

    async fn update_status(&self, id: Uuid, status: UserStatus) -> Result<User, RepoError> {
        let mut user = self.find_by_id(id).await?.ok_or(RepoError::NotFound)?;
        user.status = status;
        self.update(user).await
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<User, RepoError> {
        let mut user = self.find_by_id(id).await?.ok_or(RepoError::NotFound)?;
        user.password_hash = password_hash.to_string();
        self.update(user).await
    }
}

#[async_trait]
impl PostRepository for Table<Post> {
    async fn find_published(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.filter(|p| p.is_publish))
    }

    async fn find_published_by_tag(&self, tag_id: Uuid) -> Result<Vec<Post>, RepoError> {
        Ok(self.filter(|p| p.is_publish && p.tags.iter().any(|t| t.id == tag_id)))
    }
}

#[async_trait]
impl TagRepository for Table<Tag> {
    async fn find_by_title(&self, title: &str) -> Result<Option<Tag>, RepoError> {
        Ok(self.filter(|t| t.title == title).into_iter().next())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Tag>, RepoError> {
        Ok(self.filter(|t| ids.contains(&t.id)))
    }
}

#[async_trait]
impl CommentRepository for Table<Comment> {
    async fn publish(&self, id: Uuid) -> Result<Comment, RepoError> {
        let mut comment = self.find_by_id(id).await?.ok_or(RepoError::NotFound)?;
        comment.is_publish = true;
        self.update(comment).await
    }

    async fn find_by_post(
        &self,
        post_id: Uuid,
        is_publish: bool,
    ) -> Result<Vec<CommentWithAuthor>, RepoError> {
        Ok(self
            .filter(|c| c.post_id == post_id && c.is_publish == is_publish)
            .into_iter()
            .map(|comment| CommentWithAuthor {
                comment,
                author: None,
            })
            .collect())
    }
}

/// Reversible "hash" so tests can tell hashed from plain values.
pub struct PlainHasher;

impl PasswordService for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("hashed:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(hash == format!("hashed:{password}"))
    }
}

/// Tokens of the form `<kind>|<id>|<email>|<role>`.
pub struct PlainTokens;

impl PlainTokens {
    fn prefix(kind: TokenKind) -> &'static str {
        match kind {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl TokenService for PlainTokens {
    fn generate_token(&self, kind: TokenKind, payload: &TokenPayload) -> Result<String, AuthError> {
        Ok(format!(
            "{}|{}|{}|{}",
            Self::prefix(kind),
            payload.id,
            payload.email,
            payload.role
        ))
    }

    fn validate_token(&self, kind: TokenKind, token: &str) -> Result<TokenClaims, AuthError> {
        let parts: Vec<&str> = token.split('|').collect();
        let invalid = || AuthError::InvalidToken(token.to_string());
        if parts.len() != 4 || parts[0] != Self::prefix(kind) {
            return Err(invalid());
        }
        Ok(TokenClaims {
            payload: TokenPayload {
                id: parts[1].parse().map_err(|_| invalid())?,
                email: parts[2].to_string(),
                role: parts[3].parse().map_err(|_| invalid())?,
            },
            exp: 0,
        })
    }

    fn expiration_seconds(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Access => 900,
            TokenKind::Refresh => 3600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Confirm { to: String, token: String },
    Reset { to: String, token: String },
}

/// Mailer that records what it was asked to send.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<Sent>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn confirm_email(&self, to: &str, token: &str) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(Sent::Confirm {
            to: to.to_string(),
            token: token.to_string(),
        });
        Ok(())
    }

    async fn reset_password(&self, to: &str, token: &str) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(Sent::Reset {
            to: to.to_string(),
            token: token.to_string(),
        });
        Ok(())
    }
}
