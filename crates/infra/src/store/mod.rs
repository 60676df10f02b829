//! Record-oriented persistence façade.
//!
//! One trait, two backends: [`PostgresStore`] for production and
//! [`InMemoryStore`] for tests. Handlers receive the trait object, so tests
//! can substitute the backend without touching the HTTP layer.
//!
//! ## Error mapping (Postgres backend)
//!
//! | SQLx error | PostgreSQL code | `StoreError` |
//! |------------|-----------------|--------------|
//! | Database (unique violation) | `23505` | `Duplicate` (field from constraint name) |
//! | Database (foreign key violation) | `23503` | `Constraint` with a human hint |
//! | anything else | — | `Database` |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use stockroom_core::{OrderId, ProductId, SupplierId, UserId};
use stockroom_orders::{Order, OrderItem, OrderLine};
use stockroom_products::{Product, ProductWithSuppliers};
use stockroom_suppliers::Supplier;
use stockroom_users::User;

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

#[cfg(test)]
mod tests;

/// Persistence failure surfaced to the HTTP boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed record does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A designated-unique column is already taken.
    #[error("{0} already exists")]
    Duplicate(&'static str),

    /// An order line asked for more units than the product has.
    #[error("insufficient stock for product {product_id}")]
    InsufficientStock { product_id: ProductId },

    /// Referential integrity violation, with a best-effort hint.
    #[error("constraint violated: {hint}")]
    Constraint { hint: String },

    /// A row could not be mapped back into a domain record.
    #[error("failed to decode row: {0}")]
    Decode(String),

    /// Any other database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// An order together with its lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Date-range read model: order, lines, and the owning user/supplier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub user: Option<User>,
    pub supplier: Option<Supplier>,
}

/// Record-oriented operations for the five record kinds.
///
/// Multi-step writes (`place_order`, the deletes that cascade) are atomic:
/// either every step lands or none does.
#[async_trait]
pub trait Store: Send + Sync {
    // ----- users -----

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;
    /// Overwrite the stored row; `NotFound` when the id does not exist.
    async fn update_user(&self, user: &User) -> Result<(), StoreError>;
    async fn delete_user(&self, id: UserId) -> Result<(), StoreError>;

    // ----- suppliers -----

    async fn list_suppliers(&self) -> Result<Vec<Supplier>, StoreError>;
    async fn get_supplier(&self, id: SupplierId) -> Result<Option<Supplier>, StoreError>;
    async fn get_supplier_by_email(&self, email: &str) -> Result<Option<Supplier>, StoreError>;
    async fn get_supplier_by_phone(&self, phone: &str) -> Result<Option<Supplier>, StoreError>;
    async fn insert_supplier(&self, supplier: &Supplier) -> Result<(), StoreError>;
    async fn update_supplier(&self, supplier: &Supplier) -> Result<(), StoreError>;
    async fn delete_supplier(&self, id: SupplierId) -> Result<(), StoreError>;

    // ----- products -----

    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;
    async fn get_product_by_serial(&self, serial: &str) -> Result<Option<Product>, StoreError>;
    /// Which of `ids` do not exist as suppliers (for descriptive 400s).
    async fn missing_suppliers(&self, ids: &[SupplierId]) -> Result<Vec<SupplierId>, StoreError>;
    /// Insert the product and its supplier associations atomically.
    async fn insert_product(
        &self,
        product: &Product,
        supplier_ids: &[SupplierId],
    ) -> Result<(), StoreError>;
    /// Overwrite the row; when `supplier_ids` is given, replace the
    /// associations as well.
    async fn update_product(
        &self,
        product: &Product,
        supplier_ids: Option<&[SupplierId]>,
    ) -> Result<(), StoreError>;
    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError>;
    async fn products_by_supplier(&self, id: SupplierId) -> Result<Vec<Product>, StoreError>;
    /// Products this client has ordered, deduplicated per order (a product
    /// appearing in two orders shows up twice).
    async fn products_by_client(&self, id: UserId) -> Result<Vec<Product>, StoreError>;
    async fn product_with_suppliers(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductWithSuppliers>, StoreError>;
    /// Unconditional signed restock: `stock = stock + delta`.
    async fn adjust_stock(&self, id: ProductId, delta: i64) -> Result<Product, StoreError>;

    // ----- orders -----

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;
    async fn get_order(&self, id: OrderId) -> Result<Option<OrderWithItems>, StoreError>;
    /// The order/stock workflow, in one transaction: insert the order, then
    /// per line conditionally decrement stock and insert the order item.
    /// Fails with `NotFound("product")` or `InsufficientStock` and rolls
    /// everything back.
    async fn place_order(
        &self,
        order: &Order,
        lines: &[OrderLine],
    ) -> Result<OrderWithItems, StoreError>;
    async fn update_order(&self, order: &Order) -> Result<(), StoreError>;
    /// Delete the order and its items (explicit delete-then-delete, one
    /// transaction).
    async fn delete_order(&self, id: OrderId) -> Result<(), StoreError>;
    /// Orders created within `[start, end]`, nested with items and owner.
    async fn orders_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<OrderDetails>, StoreError>;
}
