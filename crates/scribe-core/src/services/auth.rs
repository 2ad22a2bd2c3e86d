use std::sync::Arc;

use crate::domain::{NewUser, User, UserStatus};
use crate::error::{DomainError, DomainResult};
use crate::ports::{
    BaseRepository, Mailer, PasswordService, TokenKind, TokenPayload, TokenService, UserRepository,
};

use super::UserService;

/// A signed token together with the `Set-Cookie` value that carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub cookie: String,
}

/// Registration, login, confirmation and password recovery.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    user_service: Arc<UserService>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
    mailer: Arc<dyn Mailer>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        user_service: Arc<UserService>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            users,
            user_service,
            passwords,
            tokens,
            mailer,
        }
    }

    /// Register a user and mail them a confirmation link.
    ///
    /// A mail failure is logged but does not undo the registration.
    pub async fn create_user(&self, input: NewUser) -> DomainResult<User> {
        let password = self.generate_password(&input.password)?;
        let user = self
            .user_service
            .create_user(NewUser { password, ..input })
            .await?;

        let IssuedToken { token, .. } = self.jwt_access_token(&user)?;
        if let Err(e) = self.mailer.confirm_email(&user.email, &token).await {
            tracing::warn!(user_id = %user.id, error = %e, "confirmation mail not sent");
        }

        Ok(user)
    }

    /// Check credentials. Unknown and inactive accounts look the same to the caller.
    pub async fn login_user(&self, email: &str, password: &str) -> DomainResult<User> {
        let user = match self.users.find_by_email(email).await? {
            Some(user) if user.is_active() => user,
            _ => return Err(DomainError::not_found("Invalid password or email")),
        };

        if !self.passwords.verify(password, &user.password_hash)? {
            return Err(DomainError::Internal("Wrong credentials provided".to_string()));
        }

        tracing::info!(user_id = %user.id, "user logged in");
        Ok(user)
    }

    /// Activate the account referenced by a signed confirmation code.
    pub async fn confirm_user(&self, code: &str) -> DomainResult<User> {
        let claims = self
            .tokens
            .validate_token(TokenKind::Access, code)
            .map_err(|e| DomainError::BadRequest(e.to_string()))?;

        let user = self
            .users
            .find_by_id(claims.payload.id)
            .await?
            .ok_or_else(|| DomainError::not_found("User doesnt exist"))?;

        let user = self.users.update_status(user.id, UserStatus::Active).await?;
        tracing::info!(user_id = %user.id, "user confirmed");
        Ok(user)
    }

    /// Mail a password reset link to `email`.
    pub async fn reset_password(&self, email: &str) -> DomainResult<()> {
        let user = self.user_service.find_user_by_email(email).await?;

        let IssuedToken { token, .. } = self.jwt_access_token(&user)?;
        self.mailer
            .reset_password(&user.email, &token)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))
    }

    /// Replace the password of `email`. The new password must differ from the old one.
    pub async fn restore_password(&self, email: &str, new_password: &str) -> DomainResult<()> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| DomainError::not_found("User doesnt exist"))?;

        if self.passwords.verify(new_password, &user.password_hash)? {
            return Err(DomainError::BadRequest(
                "The old and new password are the same".to_string(),
            ));
        }

        let hashed = self.generate_password(new_password)?;
        self.users.update_password(user.id, &hashed).await?;
        tracing::info!(user_id = %user.id, "password restored");
        Ok(())
    }

    pub fn jwt_access_token(&self, user: &User) -> DomainResult<IssuedToken> {
        self.issue(TokenKind::Access, user)
    }

    pub fn jwt_refresh_token(&self, user: &User) -> DomainResult<IssuedToken> {
        self.issue(TokenKind::Refresh, user)
    }

    /// Trade a refresh token for a fresh access token.
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<(User, IssuedToken)> {
        let claims = self
            .tokens
            .validate_token(TokenKind::Refresh, refresh_token)
            .map_err(|_| DomainError::forbidden("User not authorized"))?;

        let user = self
            .users
            .find_by_id(claims.payload.id)
            .await?
            .ok_or_else(|| DomainError::not_found("User doesnt exist"))?;

        let access = self.jwt_access_token(&user)?;
        Ok((user, access))
    }

    /// Cookies that expire both tokens on the client.
    pub fn logout_cookies(&self) -> [String; 2] {
        [TokenKind::Access, TokenKind::Refresh].map(|kind| cookie(kind, "", 0))
    }

    pub fn generate_password(&self, password: &str) -> DomainResult<String> {
        Ok(self.passwords.hash(password)?)
    }

    fn issue(&self, kind: TokenKind, user: &User) -> DomainResult<IssuedToken> {
        let token = self
            .tokens
            .generate_token(kind, &TokenPayload::from(user))
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        let cookie = cookie(kind, &token, self.tokens.expiration_seconds(kind));
        Ok(IssuedToken { token, cookie })
    }
}

fn cookie(kind: TokenKind, value: &str, max_age: i64) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}",
        kind.cookie_name(),
        value,
        max_age
    )
}
