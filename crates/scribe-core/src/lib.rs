//! # Scribe Core
//!
//! The domain layer of the Scribe blog backend.
//! Entities, access policy, repository/auth/mail ports and the domain services
//! built on top of them. No infrastructure dependencies live here.

pub mod domain;
pub mod error;
pub mod policy;
pub mod ports;
pub mod services;

pub use error::DomainError;
