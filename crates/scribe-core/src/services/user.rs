use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{NewUser, User, UserPatch};
use crate::error::{DomainError, DomainResult};
use crate::ports::{BaseRepository, UserRepository};

/// Account management: creation, lookup and admin edits.
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Persist a new account. `input.password` must already be hashed.
    pub async fn create_user(&self, input: NewUser) -> DomainResult<User> {
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(DomainError::Conflict("User already exists".to_string()));
        }

        let user = User::new(input.name, input.email, input.password);
        let saved = self.users.insert(user).await?;
        tracing::info!(user_id = %saved.id, "user created");
        Ok(saved)
    }

    pub async fn find_user_by_email(&self, email: &str) -> DomainResult<User> {
        self.users
            .find_by_email(email)
            .await?
            .ok_or_else(|| DomainError::not_found("User doesnt found"))
    }

    pub async fn find_users(&self) -> DomainResult<Vec<User>> {
        Ok(self.users.find_all().await?)
    }

    pub async fn find_me(&self, id: Uuid) -> DomainResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User doesnt exist"))
    }

    pub async fn edit_user(&self, id: Uuid, patch: UserPatch) -> DomainResult<User> {
        let mut user = self.find_me(id).await?;
        if let Some(role) = patch.role {
            user.role = role;
        }
        if let Some(status) = patch.status {
            user.status = status;
        }
        user.touch();

        Ok(self.users.update(user).await?)
    }
}
