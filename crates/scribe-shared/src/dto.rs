//! Data Transfer Objects - request/response types for the API.
//!
//! Request types derive [`Validate`]; the server rejects violations with 422
//! and the collected messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

const ROLES: [&str; 3] = ["ADMIN", "MANAGER", "USER"];
const STATUSES: [&str; 2] = ["ACTIVE", "INACTIVE"];

fn validate_role(value: &str) -> Result<(), ValidationError> {
    if ROLES.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new("role")
            .with_message("role must be one of the following values: ADMIN, MANAGER, USER".into()))
    }
}

fn validate_status(value: &str) -> Result<(), ValidationError> {
    if STATUSES.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new("status")
            .with_message("status must be one of the following values: ACTIVE, INACTIVE".into()))
    }
}

/// Declared field order of a request, used to report violations in that order.
pub trait FieldOrder {
    const FIELDS: &'static [&'static str];

    /// Position of `field`; unknown fields sort last.
    fn position(field: &str) -> usize {
        Self::FIELDS
            .iter()
            .position(|f| *f == field)
            .unwrap_or(Self::FIELDS.len())
    }
}

macro_rules! field_order {
    ($($ty:ty => [$($field:literal),* $(,)?];)+) => {
        $(impl FieldOrder for $ty {
            const FIELDS: &'static [&'static str] = &[$($field),*];
        })+
    };
}

field_order! {
    RegisterUserRequest => ["name", "email", "password"];
    LoginRequest => ["email", "password"];
    ResetPasswordRequest => ["email"];
    RestorePasswordRequest => ["password"];
    UpdateUserRequest => ["role", "status"];
    CreateTagRequest => ["title"];
    CreatePostRequest => ["title", "text", "tags"];
    UpdatePostRequest => ["title", "text", "tags", "is_publish"];
    CreateCommentRequest => ["text", "post_id", "is_publish"];
}

// ---- auth ----

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "name should not be empty"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "email must be an email"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "password must be longer than or equal to 6 characters"))]
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(email(message = "email must be an email"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "password should not be empty"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    #[validate(email(message = "email must be an email"))]
    pub email: String,
}

/// New password; the account comes from the reset token.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RestorePasswordRequest {
    #[serde(default)]
    #[validate(length(min = 6, message = "password must be longer than or equal to 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmQuery {
    pub token: String,
}

/// Response to a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub jwt: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub jwt: String,
}

// ---- users ----

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(custom(function = "validate_role"))]
    pub role: Option<String>,
    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---- tags ----

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTagRequest {
    #[serde(default)]
    #[validate(length(min = 3, message = "title must be longer than or equal to 3 characters"))]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reference to an existing tag inside a post payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TagRef {
    pub id: Uuid,
}

// ---- posts ----

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "title should not be empty"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "text should not be empty"))]
    pub text: String,
    #[serde(default)]
    pub tags: Vec<TagRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, message = "title should not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "text should not be empty"))]
    pub text: Option<String>,
    pub tags: Option<Vec<TagRef>>,
    pub is_publish: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub views_count: i32,
    pub is_publish: bool,
    pub user_id: Uuid,
    pub tags: Vec<TagResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---- comments ----

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "text should not be empty"))]
    pub text: String,
    pub post_id: Uuid,
    #[serde(default)]
    pub is_publish: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommenterResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub text: String,
    pub is_publish: bool,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<CommenterResponse>,
}
