//! Role-based access policy.
//!
//! Every authorization decision in the services goes through [`evaluate`],
//! a pure function of `(role, action, ownership)`. Route-level role checks go
//! through [`authorize`].

use uuid::Uuid;

use crate::domain::{Post, Role};
use crate::error::DomainError;
use crate::ports::TokenPayload;

/// Something a caller attempts to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Read a single post.
    ReadPost { published: bool },
    EditPost,
    DeletePost,
    /// Change the publish flag of an existing post.
    ChangePublishState,
    /// See every post, published or not.
    ListAllPosts,
    /// Have a newly created post or comment published immediately.
    PublishOnCreate,
}

/// How the caller relates to the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Owner,
    NotOwner,
}

impl Ownership {
    /// Ownership proxy for posts: the caller id is compared with the *post* id,
    /// not the post's `user_id`. Kept as the observed behaviour of the API.
    pub fn of_post(post: &Post, caller_id: Uuid) -> Self {
        Self::of_post_id(post.id, caller_id)
    }

    pub fn of_post_id(post_id: Uuid, caller_id: Uuid) -> Self {
        if post_id == caller_id {
            Ownership::Owner
        } else {
            Ownership::NotOwner
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

/// Decide whether `role` may perform `action`. `None` is an anonymous caller.
pub fn evaluate(role: Option<Role>, action: Action, ownership: Ownership) -> Decision {
    use Action::*;

    let allowed = match (role, action) {
        (_, ReadPost { published: true }) => true,
        (Some(Role::Admin), _) => true,
        (Some(Role::Manager), ReadPost { published: false } | EditPost | DeletePost) => {
            ownership == Ownership::Owner
        }
        _ => false,
    };

    if allowed {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// Whether `caller` is "accessible" for a post: ADMIN, or the MANAGER owner proxy.
pub fn is_accessible(caller: Option<&TokenPayload>, post: &Post) -> bool {
    match caller {
        Some(c) => evaluate(Some(c.role), Action::EditPost, Ownership::of_post(post, c.id)).is_allowed(),
        None => false,
    }
}

/// Route guard: a token context must exist, and when `allowed` is non-empty
/// the caller's role must be in it.
pub fn authorize<'a>(
    caller: Option<&'a TokenPayload>,
    allowed: &[Role],
) -> Result<&'a TokenPayload, DomainError> {
    let caller = caller.ok_or_else(|| DomainError::forbidden("User not authorized"))?;
    if !allowed.is_empty() && !allowed.contains(&caller.role) {
        return Err(DomainError::forbidden("No permissions"));
    }
    Ok(caller)
}
