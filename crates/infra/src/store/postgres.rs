//! Postgres-backed store implementation.
//!
//! Uses the SQLx connection pool (thread-safe, `Send + Sync`). Multi-step
//! writes run inside explicit transactions; the order/stock sequence uses a
//! conditional decrement (`... AND stock >= quantity`) so concurrent orders
//! cannot race stock below zero.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use stockroom_core::{OrderId, OrderItemId, ProductId, SupplierId, UserId};
use stockroom_orders::{Order, OrderItem, OrderLine};
use stockroom_products::{Product, ProductWithSuppliers};
use stockroom_suppliers::Supplier;
use stockroom_users::User;

use super::{OrderDetails, OrderWithItems, Store, StoreError};

/// Postgres-backed record store.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map driver errors onto the store taxonomy.
///
/// Unique violations name the offending field (derived from the constraint
/// name); foreign-key violations get the human hint the API surfaces on 500s.
fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some("23505") => {
                let constraint = db.constraint().unwrap_or_default();
                let field = if constraint.contains("email") {
                    "email"
                } else if constraint.contains("phone") {
                    "phone"
                } else if constraint.contains("serial") {
                    "serial number"
                } else {
                    "unique value"
                };
                return StoreError::Duplicate(field);
            }
            Some("23503") => {
                return StoreError::Constraint {
                    hint: "a referenced supplier, product, or user does not exist".into(),
                };
            }
            _ => {}
        }
    }
    StoreError::Database(err)
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    address: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse()
            .map_err(|_| StoreError::Decode(format!("unknown role '{}'", row.role)))?;
        Ok(User {
            id: UserId::from_uuid(row.id),
            name: row.name,
            address: row.address,
            email: row.email,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct SupplierRow {
    id: Uuid,
    name: String,
    address: String,
    company: String,
    email: String,
    phone: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Supplier {
            id: SupplierId::from_uuid(row.id),
            name: row.name,
            address: row.address,
            company: row.company,
            email: row.email,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    serial_number: String,
    price: Decimal,
    stock: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            serial_number: row.serial_number,
            price: row.price,
            stock: row.stock,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct OrderRow {
    id: Uuid,
    order_date: DateTime<Utc>,
    ship_date: Option<DateTime<Utc>>,
    status: String,
    order_type: String,
    user_id: Option<Uuid>,
    supplier_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: OrderId::from_uuid(row.id),
            date: row.order_date,
            ship_date: row.ship_date,
            status: row.status,
            order_type: row.order_type,
            user_id: row.user_id.map(UserId::from_uuid),
            supplier_id: row.supplier_id.map(SupplierId::from_uuid),
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i64,
    unit_price: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: OrderItemId::from_uuid(row.id),
            order_id: OrderId::from_uuid(row.order_id),
            product_id: ProductId::from_uuid(row.product_id),
            quantity: row.quantity,
            unit_price: row.unit_price,
        }
    }
}

const USER_COLS: &str = "id, name, address, email, password_hash, role, created_at, updated_at";
const SUPPLIER_COLS: &str = "id, name, address, company, email, phone, created_at, updated_at";
const PRODUCT_COLS: &str =
    "id, name, description, serial_number, price, stock, created_at, updated_at";
const ORDER_COLS: &str =
    "id, order_date, ship_date, status, order_type, user_id, supplier_id, created_at";

impl PostgresStore {
    async fn items_of(&self, order_id: OrderId) -> Result<Vec<OrderItem>, StoreError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, order_id, product_id, quantity, unit_price \
             FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }
}

#[async_trait]
impl Store for PostgresStore {
    // ----- users -----

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLS} FROM users ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLS} FROM users WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(User::try_from).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(User::try_from).transpose()
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, name, address, email, password_hash, role, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.address)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE users SET name = $2, address = $3, email = $4, password_hash = $5, \
             role = $6, updated_at = $7 WHERE id = $1",
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.address)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("user"));
        }
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("user"));
        }
        Ok(())
    }

    // ----- suppliers -----

    async fn list_suppliers(&self) -> Result<Vec<Supplier>, StoreError> {
        let rows = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {SUPPLIER_COLS} FROM suppliers ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Supplier::from).collect())
    }

    async fn get_supplier(&self, id: SupplierId) -> Result<Option<Supplier>, StoreError> {
        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {SUPPLIER_COLS} FROM suppliers WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Supplier::from))
    }

    async fn get_supplier_by_email(&self, email: &str) -> Result<Option<Supplier>, StoreError> {
        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {SUPPLIER_COLS} FROM suppliers WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Supplier::from))
    }

    async fn get_supplier_by_phone(&self, phone: &str) -> Result<Option<Supplier>, StoreError> {
        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {SUPPLIER_COLS} FROM suppliers WHERE phone = $1"
        ))
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Supplier::from))
    }

    async fn insert_supplier(&self, supplier: &Supplier) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO suppliers (id, name, address, company, email, phone, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(supplier.id.as_uuid())
        .bind(&supplier.name)
        .bind(&supplier.address)
        .bind(&supplier.company)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update_supplier(&self, supplier: &Supplier) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE suppliers SET name = $2, address = $3, company = $4, email = $5, \
             phone = $6, updated_at = $7 WHERE id = $1",
        )
        .bind(supplier.id.as_uuid())
        .bind(&supplier.name)
        .bind(&supplier.address)
        .bind(&supplier.company)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("supplier"));
        }
        Ok(())
    }

    async fn delete_supplier(&self, id: SupplierId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("supplier"));
        }
        Ok(())
    }

    // ----- products -----

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLS} FROM products ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLS} FROM products WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Product::from))
    }

    async fn get_product_by_serial(&self, serial: &str) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLS} FROM products WHERE serial_number = $1"
        ))
        .bind(serial)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Product::from))
    }

    async fn missing_suppliers(&self, ids: &[SupplierId]) -> Result<Vec<SupplierId>, StoreError> {
        let wanted: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let found: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM suppliers WHERE id = ANY($1)")
                .bind(&wanted)
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(ids
            .iter()
            .filter(|id| !found.contains(id.as_uuid()))
            .copied()
            .collect())
    }

    async fn insert_product(
        &self,
        product: &Product,
        supplier_ids: &[SupplierId],
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            "INSERT INTO products (id, name, description, serial_number, price, stock, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.serial_number)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        for supplier_id in supplier_ids {
            sqlx::query("INSERT INTO product_suppliers (product_id, supplier_id) VALUES ($1, $2)")
                .bind(product.id.as_uuid())
                .bind(supplier_id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn update_product(
        &self,
        product: &Product,
        supplier_ids: Option<&[SupplierId]>,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let result = sqlx::query(
            "UPDATE products SET name = $2, description = $3, serial_number = $4, \
             price = $5, stock = $6, updated_at = $7 WHERE id = $1",
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.serial_number)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("product"));
        }

        if let Some(supplier_ids) = supplier_ids {
            sqlx::query("DELETE FROM product_suppliers WHERE product_id = $1")
                .bind(product.id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;

            for supplier_id in supplier_ids {
                sqlx::query(
                    "INSERT INTO product_suppliers (product_id, supplier_id) VALUES ($1, $2)",
                )
                .bind(product.id.as_uuid())
                .bind(supplier_id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
            }
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("product"));
        }
        Ok(())
    }

    async fn products_by_supplier(&self, id: SupplierId) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT p.id, p.name, p.description, p.serial_number, p.price, p.stock, \
                    p.created_at, p.updated_at \
             FROM products p \
             JOIN product_suppliers ps ON ps.product_id = p.id \
             WHERE ps.supplier_id = $1 \
             ORDER BY p.created_at",
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn products_by_client(&self, id: UserId) -> Result<Vec<Product>, StoreError> {
        // Deduplicated within each order, deliberately not across orders.
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT DISTINCT ON (o.id, p.id) \
                    p.id, p.name, p.description, p.serial_number, p.price, p.stock, \
                    p.created_at, p.updated_at \
             FROM orders o \
             JOIN order_items oi ON oi.order_id = o.id \
             JOIN products p ON p.id = oi.product_id \
             WHERE o.user_id = $1 \
             ORDER BY o.id, p.id",
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn product_with_suppliers(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductWithSuppliers>, StoreError> {
        let Some(product) = self.get_product(id).await? else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, SupplierRow>(
            "SELECT s.id, s.name, s.address, s.company, s.email, s.phone, \
                    s.created_at, s.updated_at \
             FROM suppliers s \
             JOIN product_suppliers ps ON ps.supplier_id = s.id \
             WHERE ps.product_id = $1 \
             ORDER BY s.created_at",
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(Some(ProductWithSuppliers {
            product,
            suppliers: rows.into_iter().map(Supplier::from).collect(),
        }))
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn adjust_stock(&self, id: ProductId, delta: i64) -> Result<Product, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET stock = stock + $2, updated_at = $3 \
             WHERE id = $1 RETURNING {PRODUCT_COLS}"
        ))
        .bind(id.as_uuid())
        .bind(delta)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(Product::from).ok_or(StoreError::NotFound("product"))
    }

    // ----- orders -----

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLS} FROM orders ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<OrderWithItems>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLS} FROM orders WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else { return Ok(None) };
        let order = Order::from(row);
        let items = self.items_of(order.id).await?;

        Ok(Some(OrderWithItems { order, items }))
    }

    #[instrument(skip(self, order, lines), fields(order_id = %order.id, line_count = lines.len()), err)]
    async fn place_order(
        &self,
        order: &Order,
        lines: &[OrderLine],
    ) -> Result<OrderWithItems, StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            "INSERT INTO orders (id, order_date, ship_date, status, order_type, user_id, supplier_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(order.id.as_uuid())
        .bind(order.date)
        .bind(order.ship_date)
        .bind(&order.status)
        .bind(&order.order_type)
        .bind(order.user_id.map(|id| *id.as_uuid()))
        .bind(order.supplier_id.map(|id| *id.as_uuid()))
        .bind(order.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            // Conditional decrement: zero rows affected means the product is
            // missing or short on stock. Returning early drops the
            // transaction, rolling back the order and every prior line.
            let updated = sqlx::query(
                "UPDATE products SET stock = stock - $2, updated_at = $3 \
                 WHERE id = $1 AND stock >= $2",
            )
            .bind(line.product_id.as_uuid())
            .bind(line.quantity)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

            if updated.rows_affected() == 0 {
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
                        .bind(line.product_id.as_uuid())
                        .fetch_one(&mut *tx)
                        .await
                        .map_err(map_sqlx_error)?;

                return Err(if exists {
                    StoreError::InsufficientStock {
                        product_id: line.product_id,
                    }
                } else {
                    StoreError::NotFound("product")
                });
            }

            let item = OrderItem {
                id: OrderItemId::new(),
                order_id: order.id,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            };

            sqlx::query(
                "INSERT INTO order_items (id, order_id, product_id, quantity, unit_price) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(item.id.as_uuid())
            .bind(item.order_id.as_uuid())
            .bind(item.product_id.as_uuid())
            .bind(item.quantity)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

            items.push(item);
        }

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(OrderWithItems {
            order: order.clone(),
            items,
        })
    }

    async fn update_order(&self, order: &Order) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE orders SET order_date = $2, ship_date = $3, status = $4, order_type = $5 \
             WHERE id = $1",
        )
        .bind(order.id.as_uuid())
        .bind(order.date)
        .bind(order.ship_date)
        .bind(&order.status)
        .bind(&order.order_type)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("order"));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(order_id = %id), err)]
    async fn delete_order(&self, id: OrderId) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("order"));
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn orders_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<OrderDetails>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLS} FROM orders \
             WHERE created_at >= $1 AND created_at <= $2 \
             ORDER BY created_at"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut details = Vec::with_capacity(rows.len());
        for row in rows {
            let order = Order::from(row);
            let items = self.items_of(order.id).await?;

            let user = match order.user_id {
                Some(user_id) => {
                    let row = sqlx::query_as::<_, UserRow>(&format!(
                        "SELECT {USER_COLS} FROM users WHERE id = $1"
                    ))
                    .bind(user_id.as_uuid())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;
                    row.map(User::try_from).transpose()?
                }
                None => None,
            };

            let supplier = match order.supplier_id {
                Some(supplier_id) => self.get_supplier(supplier_id).await?,
                None => None,
            };

            details.push(OrderDetails {
                order,
                items,
                user,
                supplier,
            });
        }

        Ok(details)
    }
}
