use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use stockroom_core::{validate, DomainError, DomainResult, ProductId, SupplierId};
use stockroom_suppliers::Supplier;

/// A stored product.
///
/// `serial_number` is unique across products. Stock must not go negative as
/// a result of an order; the store enforces that with a conditional
/// decrement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub serial_number: String,
    pub price: Decimal,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stock-detail read: a product together with the suppliers that carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductWithSuppliers {
    pub product: Product,
    pub suppliers: Vec<Supplier>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub serial_number: String,
    pub price: Decimal,
    pub stock: i64,
    pub supplier_ids: Vec<SupplierId>,
}

impl NewProduct {
    pub fn validate(&self) -> DomainResult<()> {
        validate::require("name", &self.name)?;
        validate::require("description", &self.description)?;
        validate::require("serialNumber", &self.serial_number)?;

        if self.price < Decimal::ZERO {
            return Err(DomainError::validation("price must not be negative"));
        }
        if self.stock < 0 {
            return Err(DomainError::validation("stock must not be negative"));
        }
        if self.supplier_ids.is_empty() {
            return Err(DomainError::validation(
                "product must reference at least one supplier",
            ));
        }
        Ok(())
    }
}

/// Partial update: only the provided fields are overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub serial_number: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
    pub supplier_ids: Option<Vec<SupplierId>>,
}

impl ProductUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(serial) = &self.serial_number {
            validate::require("serialNumber", serial)?;
        }
        if matches!(self.price, Some(p) if p < Decimal::ZERO) {
            return Err(DomainError::validation("price must not be negative"));
        }
        if matches!(self.stock, Some(s) if s < 0) {
            return Err(DomainError::validation("stock must not be negative"));
        }
        if matches!(&self.supplier_ids, Some(ids) if ids.is_empty()) {
            return Err(DomainError::validation(
                "product must reference at least one supplier",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn new_product() -> NewProduct {
        NewProduct {
            name: "Lamp PH-2".into(),
            description: "Warm-white desk lamp".into(),
            serial_number: "ODS241".into(),
            price: dec("10.99"),
            stock: 100,
            supplier_ids: vec![SupplierId::new()],
        }
    }

    #[test]
    fn complete_input_validates() {
        assert!(new_product().validate().is_ok());
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut input = new_product();
        input.price = dec("-0.01");
        assert!(input.validate().is_err());
    }

    #[test]
    fn negative_stock_is_rejected() {
        let mut input = new_product();
        input.stock = -1;
        assert!(input.validate().is_err());
    }

    #[test]
    fn product_needs_a_supplier() {
        let mut input = new_product();
        input.supplier_ids.clear();
        assert!(input.validate().is_err());
    }

    #[test]
    fn update_accepts_partial_fields() {
        assert!(ProductUpdate::default().validate().is_ok());
        assert!(ProductUpdate {
            price: Some(dec("3.50")),
            ..ProductUpdate::default()
        }
        .validate()
        .is_ok());
        assert!(ProductUpdate {
            stock: Some(-5),
            ..ProductUpdate::default()
        }
        .validate()
        .is_err());
    }
}
