use chrono::{DateTime, Utc};

use stockroom_core::{validate, DomainResult, SupplierId};

/// A stored supplier.
///
/// Email and phone are each unique across suppliers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub address: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSupplier {
    pub name: String,
    pub address: String,
    pub company: String,
    pub email: String,
    pub phone: String,
}

impl NewSupplier {
    pub fn validate(&self) -> DomainResult<()> {
        validate::require("name", &self.name)?;
        validate::require("address", &self.address)?;
        validate::require("company", &self.company)?;
        validate::require("email", &self.email)?;
        validate::email(&self.email)?;
        validate::require("phone", &self.phone)?;
        Ok(())
    }
}

/// Partial update: only the provided fields are overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplierUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl SupplierUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(email) = &self.email {
            validate::require("email", email)?;
            validate::email(email)?;
        }
        if let Some(phone) = &self.phone {
            validate::require("phone", phone)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_supplier() -> NewSupplier {
        NewSupplier {
            name: "Helder Lighting".into(),
            address: "4 Quay Street".into(),
            company: "Helder Lda".into(),
            email: "sales@helder.example".into(),
            phone: "+351210000000".into(),
        }
    }

    #[test]
    fn complete_input_validates() {
        assert!(new_supplier().validate().is_ok());
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut input = new_supplier();
        input.email = "sales at helder".into();
        assert!(input.validate().is_err());
    }

    #[test]
    fn blank_phone_is_rejected() {
        let mut input = new_supplier();
        input.phone = "  ".into();
        assert!(input.validate().is_err());
    }

    #[test]
    fn update_validates_only_provided_fields() {
        assert!(SupplierUpdate::default().validate().is_ok());
        assert!(SupplierUpdate {
            email: Some("bad".into()),
            ..SupplierUpdate::default()
        }
        .validate()
        .is_err());
    }
}
