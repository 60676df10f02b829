//! Field-level validation helpers shared by the record crates.

use crate::error::{DomainError, DomainResult};

/// Reject missing/blank required fields.
pub fn require(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Shape check for email addresses: must contain "@" and ".", no whitespace.
pub fn email(value: &str) -> DomainResult<()> {
    let shaped = value.contains('@')
        && value.contains('.')
        && !value.chars().any(char::is_whitespace);

    if !shaped {
        return Err(DomainError::validation("email is not valid"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_required_field_is_rejected() {
        assert!(require("name", "").is_err());
        assert!(require("name", "   ").is_err());
        assert!(require("name", "Widget").is_ok());
    }

    #[test]
    fn email_shape_check() {
        assert!(email("ops@example.com").is_ok());
        assert!(email("missing-at.example.com").is_err());
        assert!(email("missing-dot@example").is_err());
        assert!(email("spaced @example.com").is_err());
    }
}
