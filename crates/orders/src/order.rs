use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use stockroom_core::{validate, DomainError, DomainResult, OrderId, OrderItemId, ProductId, SupplierId, UserId};

/// A stored order.
///
/// Exactly one of `user_id`/`supplier_id` is populated: an order is placed
/// either by a client or towards a supplier, never both. The rule is
/// enforced when the request is validated ([`OrderRecipient::resolve`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub date: DateTime<Utc>,
    pub ship_date: Option<DateTime<Utc>>,
    pub status: String,
    pub order_type: String,
    pub user_id: Option<UserId>,
    pub supplier_id: Option<SupplierId>,
    pub created_at: DateTime<Utc>,
}

/// A stored order line. Created only as part of order placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    /// Price captured at the time of the order.
    pub unit_price: Decimal,
}

/// One requested product/quantity/unitPrice entry of a placement request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Decimal,
}

impl OrderLine {
    pub fn validate(&self) -> DomainResult<()> {
        if self.quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if self.unit_price < Decimal::ZERO {
            return Err(DomainError::validation("unitPrice must not be negative"));
        }
        Ok(())
    }
}

/// Who an order belongs to: a client user or a supplier.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OrderRecipient {
    Client(UserId),
    Supplier(SupplierId),
}

impl OrderRecipient {
    /// Resolve the order owner from the request body and the authenticated
    /// subject.
    ///
    /// An explicit body user id wins over the token subject; a supplier id
    /// leaves the stored user id empty. Naming both is the one rejected
    /// combination.
    pub fn resolve(
        body_user: Option<UserId>,
        body_supplier: Option<SupplierId>,
        authenticated: UserId,
    ) -> DomainResult<Self> {
        match (body_user, body_supplier) {
            (Some(_), Some(_)) => Err(DomainError::validation(
                "Order must be either to a supplier or a client, not both",
            )),
            (_, Some(supplier)) => Ok(OrderRecipient::Supplier(supplier)),
            (Some(user), None) => Ok(OrderRecipient::Client(user)),
            (None, None) => Ok(OrderRecipient::Client(authenticated)),
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self {
            OrderRecipient::Client(id) => Some(*id),
            OrderRecipient::Supplier(_) => None,
        }
    }

    pub fn supplier_id(&self) -> Option<SupplierId> {
        match self {
            OrderRecipient::Client(_) => None,
            OrderRecipient::Supplier(id) => Some(*id),
        }
    }
}

/// A validated placement request, ready for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub recipient: OrderRecipient,
    pub date: DateTime<Utc>,
    pub ship_date: Option<DateTime<Utc>>,
    pub status: String,
    pub order_type: String,
    pub lines: Vec<OrderLine>,
}

impl OrderDraft {
    pub fn validate(&self) -> DomainResult<()> {
        validate::require("status", &self.status)?;
        validate::require("orderType", &self.order_type)?;

        if self.lines.is_empty() {
            return Err(DomainError::validation("order needs at least one product"));
        }
        for line in &self.lines {
            line.validate()?;
        }
        Ok(())
    }
}

/// Partial update: only the provided fields are overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    pub date: Option<DateTime<Utc>>,
    pub ship_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub order_type: Option<String>,
}

impl OrderUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(status) = &self.status {
            validate::require("status", status)?;
        }
        if let Some(order_type) = &self.order_type {
            validate::require("orderType", order_type)?;
        }
        Ok(())
    }
}
