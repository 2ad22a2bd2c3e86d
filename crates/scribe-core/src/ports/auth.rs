//! Authentication and authorization ports.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Role, User};

/// The signed `{id, email, role}` triple carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<&User> for TokenPayload {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Claims recovered from a verified token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub payload: TokenPayload,
    pub exp: i64,
}

/// Access and refresh tokens are signed with independent secrets and lifetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    /// Cookie the token travels in.
    pub fn cookie_name(&self) -> &'static str {
        match self {
            TokenKind::Access => "accessToken",
            TokenKind::Refresh => "refreshToken",
        }
    }
}

/// Token service trait for JWT operations.
pub trait TokenService: Send + Sync {
    /// Sign a payload as the given kind of token.
    fn generate_token(&self, kind: TokenKind, payload: &TokenPayload) -> Result<String, AuthError>;

    /// Validate and decode a token of the given kind.
    fn validate_token(&self, kind: TokenKind, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of the given kind of token, in seconds.
    fn expiration_seconds(&self, kind: TokenKind) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Hashing error: {0}")]
    HashingError(String),
}
