use chrono::{DateTime, Utc};

use stockroom_auth::Role;
use stockroom_core::{validate, DomainError, DomainResult, UserId};

/// Symbols accepted by the password policy.
pub const PASSWORD_SYMBOLS: &str = "!@#$&*";

/// A stored user account.
///
/// `password_hash` is the argon2 PHC string; it must never reach a client,
/// which is why this type carries no serializer — response mapping is
/// explicit at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub address: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registration/administrative creation, before hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub address: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl NewUser {
    pub fn validate(&self) -> DomainResult<()> {
        validate::require("name", &self.name)?;
        validate::require("address", &self.address)?;
        validate::require("email", &self.email)?;
        validate::email(&self.email)?;
        validate::require("password", &self.password)?;
        validate_password(&self.password)?;
        Ok(())
    }
}

/// Partial update: only the provided fields are overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl UserUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(email) = &self.email {
            validate::require("email", email)?;
            validate::email(email)?;
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.address.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.role.is_none()
    }
}

/// Password policy: at least one uppercase letter and one of [`PASSWORD_SYMBOLS`].
pub fn validate_password(plain: &str) -> DomainResult<()> {
    let has_upper = plain.chars().any(|c| c.is_ascii_uppercase());
    let has_symbol = plain.chars().any(|c| PASSWORD_SYMBOLS.contains(c));

    if !has_upper || !has_symbol {
        return Err(DomainError::validation(
            "password must contain at least one uppercase letter and one special character",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user() -> NewUser {
        NewUser {
            name: "Alex Costa".into(),
            address: "12 Dock Road".into(),
            email: "alex@example.com".into(),
            password: "Sup3r#secret".into(),
            role: Role::Client,
        }
    }

    #[test]
    fn complete_input_validates() {
        assert!(new_user().validate().is_ok());
    }

    #[test]
    fn each_required_field_is_enforced() {
        for field in ["name", "address", "email", "password"] {
            let mut input = new_user();
            match field {
                "name" => input.name.clear(),
                "address" => input.address.clear(),
                "email" => input.email.clear(),
                _ => input.password.clear(),
            }
            assert!(input.validate().is_err(), "blank {field} must fail");
        }
    }

    #[test]
    fn password_policy_requires_uppercase_and_symbol() {
        assert!(validate_password("all-lower#case").is_err());
        assert!(validate_password("NoSymbolHere1").is_err());
        assert!(validate_password("Upper#case").is_ok());
    }

    #[test]
    fn update_with_bad_email_is_rejected() {
        let update = UserUpdate {
            email: Some("not an email".into()),
            ..UserUpdate::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(UserUpdate::default().is_empty());
        assert!(!UserUpdate {
            name: Some("New Name".into()),
            ..UserUpdate::default()
        }
        .is_empty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: a password passes exactly when it has both an
            /// uppercase letter and a policy symbol.
            #[test]
            fn password_policy_matches_character_classes(pw in "[a-zA-Z0-9!@#$&*]{0,24}") {
                let has_upper = pw.chars().any(|c| c.is_ascii_uppercase());
                let has_symbol = pw.chars().any(|c| PASSWORD_SYMBOLS.contains(c));

                prop_assert_eq!(validate_password(&pw).is_ok(), has_upper && has_symbol);
            }
        }
    }
}
