//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// uniqueness, lookups). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. missing/malformed field).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A designated-unique field is already taken.
    #[error("duplicate value for {0}")]
    Duplicate(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested record was not found (domain-level).
    #[error("{0} not found")]
    NotFound(String),

    /// Authentication failure at the domain boundary.
    #[error("unauthorized")]
    Unauthorized,

    /// The authenticated user lacks the required role.
    #[error("forbidden")]
    Forbidden,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn duplicate(field: impl Into<String>) -> Self {
        Self::Duplicate(field.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(kind: impl Into<String>) -> Self {
        Self::NotFound(kind.into())
    }
}
