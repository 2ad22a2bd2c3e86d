//! Domain-level error types.

use thiserror::Error;

use crate::ports::AuthError;

/// Domain errors - business rule failures surfaced to callers.
///
/// Each variant maps onto exactly one HTTP status at the edge.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("{0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => DomainError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => DomainError::Conflict(msg),
            RepoError::Connection(msg) | RepoError::Query(msg) => {
                tracing::error!(error = %msg, "repository failure");
                DomainError::Internal(msg)
            }
        }
    }
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::HashingError(msg) => DomainError::Internal(msg),
            other => DomainError::BadRequest(other.to_string()),
        }
    }
}

/// Result alias used by the domain services.
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_not_found_becomes_domain_not_found() {
        let err: DomainError = RepoError::NotFound.into();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn constraint_violation_becomes_conflict() {
        let err: DomainError = RepoError::Constraint("email taken".into()).into();
        assert!(matches!(err, DomainError::Conflict(ref m) if m == "email taken"));
    }

    #[test]
    fn display_is_the_bare_message() {
        let err = DomainError::forbidden("Access denied");
        assert_eq!(err.to_string(), "Access denied");
    }
}
