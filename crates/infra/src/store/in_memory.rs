//! In-memory store implementation.
//!
//! Mirrors the Postgres backend's semantics (uniqueness, conditional stock
//! decrement, all-or-nothing multi-step writes) behind a single lock, so the
//! HTTP layer and its tests can run without a database.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stockroom_core::{OrderId, OrderItemId, ProductId, SupplierId, UserId};
use stockroom_orders::{Order, OrderItem, OrderLine};
use stockroom_products::{Product, ProductWithSuppliers};
use stockroom_suppliers::Supplier;
use stockroom_users::User;

use super::{OrderDetails, OrderWithItems, Store, StoreError};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, User>,
    suppliers: HashMap<SupplierId, Supplier>,
    products: HashMap<ProductId, Product>,
    product_suppliers: HashMap<ProductId, Vec<SupplierId>>,
    orders: HashMap<OrderId, Order>,
    order_items: Vec<OrderItem>,
}

/// Lock-per-call in-memory record store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_creation<T, F>(mut items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    items.sort_by_key(|item| key(item));
    items
}

#[async_trait]
impl Store for InMemoryStore {
    // ----- users -----

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(sorted_by_creation(
            inner.users.values().cloned().collect(),
            |u: &User| u.created_at,
        ))
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().unwrap().users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap();
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("email"));
        }
        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap();
        if inner
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(StoreError::Duplicate("email"));
        }
        if !inner.users.contains_key(&user.id) {
            return Err(StoreError::NotFound("user"));
        }
        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap();
        inner
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("user"))
    }

    // ----- suppliers -----

    async fn list_suppliers(&self) -> Result<Vec<Supplier>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(sorted_by_creation(
            inner.suppliers.values().cloned().collect(),
            |s: &Supplier| s.created_at,
        ))
    }

    async fn get_supplier(&self, id: SupplierId) -> Result<Option<Supplier>, StoreError> {
        Ok(self.inner.read().unwrap().suppliers.get(&id).cloned())
    }

    async fn get_supplier_by_email(&self, email: &str) -> Result<Option<Supplier>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.suppliers.values().find(|s| s.email == email).cloned())
    }

    async fn get_supplier_by_phone(&self, phone: &str) -> Result<Option<Supplier>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.suppliers.values().find(|s| s.phone == phone).cloned())
    }

    async fn insert_supplier(&self, supplier: &Supplier) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap();
        if inner.suppliers.values().any(|s| s.email == supplier.email) {
            return Err(StoreError::Duplicate("email"));
        }
        if inner.suppliers.values().any(|s| s.phone == supplier.phone) {
            return Err(StoreError::Duplicate("phone"));
        }
        inner.suppliers.insert(supplier.id, supplier.clone());
        Ok(())
    }

    async fn update_supplier(&self, supplier: &Supplier) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap();
        if !inner.suppliers.contains_key(&supplier.id) {
            return Err(StoreError::NotFound("supplier"));
        }
        inner.suppliers.insert(supplier.id, supplier.clone());
        Ok(())
    }

    async fn delete_supplier(&self, id: SupplierId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap();
        inner
            .suppliers
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("supplier"))
    }

    // ----- products -----

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(sorted_by_creation(
            inner.products.values().cloned().collect(),
            |p: &Product| p.created_at,
        ))
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.inner.read().unwrap().products.get(&id).cloned())
    }

    async fn get_product_by_serial(&self, serial: &str) -> Result<Option<Product>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .products
            .values()
            .find(|p| p.serial_number == serial)
            .cloned())
    }

    async fn missing_suppliers(&self, ids: &[SupplierId]) -> Result<Vec<SupplierId>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(ids
            .iter()
            .filter(|id| !inner.suppliers.contains_key(id))
            .copied()
            .collect())
    }

    async fn insert_product(
        &self,
        product: &Product,
        supplier_ids: &[SupplierId],
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap();
        if inner
            .products
            .values()
            .any(|p| p.serial_number == product.serial_number)
        {
            return Err(StoreError::Duplicate("serial number"));
        }
        if let Some(missing) = supplier_ids
            .iter()
            .find(|id| !inner.suppliers.contains_key(id))
        {
            return Err(StoreError::Constraint {
                hint: format!("supplier {missing} does not exist"),
            });
        }
        inner.products.insert(product.id, product.clone());
        inner
            .product_suppliers
            .insert(product.id, supplier_ids.to_vec());
        Ok(())
    }

    async fn update_product(
        &self,
        product: &Product,
        supplier_ids: Option<&[SupplierId]>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap();
        if !inner.products.contains_key(&product.id) {
            return Err(StoreError::NotFound("product"));
        }
        inner.products.insert(product.id, product.clone());
        if let Some(supplier_ids) = supplier_ids {
            inner
                .product_suppliers
                .insert(product.id, supplier_ids.to_vec());
        }
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap();
        if inner.order_items.iter().any(|item| item.product_id == id) {
            return Err(StoreError::Constraint {
                hint: "product is referenced by existing order items".into(),
            });
        }
        inner.product_suppliers.remove(&id);
        inner
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("product"))
    }

    async fn products_by_supplier(&self, id: SupplierId) -> Result<Vec<Product>, StoreError> {
        let inner = self.inner.read().unwrap();
        let products = inner
            .product_suppliers
            .iter()
            .filter(|(_, suppliers)| suppliers.contains(&id))
            .filter_map(|(product_id, _)| inner.products.get(product_id).cloned())
            .collect();
        Ok(sorted_by_creation(products, |p: &Product| p.created_at))
    }

    async fn products_by_client(&self, id: UserId) -> Result<Vec<Product>, StoreError> {
        let inner = self.inner.read().unwrap();

        let orders = sorted_by_creation(
            inner
                .orders
                .values()
                .filter(|o| o.user_id == Some(id))
                .cloned()
                .collect(),
            |o: &Order| o.created_at,
        );

        // Per-order dedup only: the same product in two orders appears twice.
        let mut result = Vec::new();
        for order in orders {
            let mut seen = Vec::new();
            for item in inner.order_items.iter().filter(|i| i.order_id == order.id) {
                if seen.contains(&item.product_id) {
                    continue;
                }
                seen.push(item.product_id);
                if let Some(product) = inner.products.get(&item.product_id) {
                    result.push(product.clone());
                }
            }
        }
        Ok(result)
    }

    async fn product_with_suppliers(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductWithSuppliers>, StoreError> {
        let inner = self.inner.read().unwrap();
        let Some(product) = inner.products.get(&id).cloned() else {
            return Ok(None);
        };

        let suppliers = inner
            .product_suppliers
            .get(&id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|sid| inner.suppliers.get(sid).cloned())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Some(ProductWithSuppliers { product, suppliers }))
    }

    async fn adjust_stock(&self, id: ProductId, delta: i64) -> Result<Product, StoreError> {
        let mut inner = self.inner.write().unwrap();
        let product = inner
            .products
            .get_mut(&id)
            .ok_or(StoreError::NotFound("product"))?;

        product.stock += delta;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    // ----- orders -----

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(sorted_by_creation(
            inner.orders.values().cloned().collect(),
            |o: &Order| o.created_at,
        ))
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<OrderWithItems>, StoreError> {
        let inner = self.inner.read().unwrap();
        let Some(order) = inner.orders.get(&id).cloned() else {
            return Ok(None);
        };
        let items = inner
            .order_items
            .iter()
            .filter(|i| i.order_id == id)
            .cloned()
            .collect();
        Ok(Some(OrderWithItems { order, items }))
    }

    async fn place_order(
        &self,
        order: &Order,
        lines: &[OrderLine],
    ) -> Result<OrderWithItems, StoreError> {
        let mut inner = self.inner.write().unwrap();

        // Validate every line before touching anything, so a late failure
        // cannot leave partial decrements behind.
        for line in lines {
            let product = inner
                .products
                .get(&line.product_id)
                .ok_or(StoreError::NotFound("product"))?;
            if product.stock < line.quantity {
                return Err(StoreError::InsufficientStock {
                    product_id: line.product_id,
                });
            }
        }

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let product = inner
                .products
                .get_mut(&line.product_id)
                .ok_or(StoreError::NotFound("product"))?;
            product.stock -= line.quantity;
            product.updated_at = Utc::now();

            items.push(OrderItem {
                id: OrderItemId::new(),
                order_id: order.id,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            });
        }

        inner.orders.insert(order.id, order.clone());
        inner.order_items.extend(items.iter().cloned());

        Ok(OrderWithItems {
            order: order.clone(),
            items,
        })
    }

    async fn update_order(&self, order: &Order) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap();
        if !inner.orders.contains_key(&order.id) {
            return Err(StoreError::NotFound("order"));
        }
        inner.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn delete_order(&self, id: OrderId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap();
        if inner.orders.remove(&id).is_none() {
            return Err(StoreError::NotFound("order"));
        }
        inner.order_items.retain(|item| item.order_id != id);
        Ok(())
    }

    async fn orders_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<OrderDetails>, StoreError> {
        let inner = self.inner.read().unwrap();

        let orders = sorted_by_creation(
            inner
                .orders
                .values()
                .filter(|o| o.created_at >= start && o.created_at <= end)
                .cloned()
                .collect(),
            |o: &Order| o.created_at,
        );

        Ok(orders
            .into_iter()
            .map(|order| {
                let items = inner
                    .order_items
                    .iter()
                    .filter(|i| i.order_id == order.id)
                    .cloned()
                    .collect();
                let user = order.user_id.and_then(|id| inner.users.get(&id).cloned());
                let supplier = order
                    .supplier_id
                    .and_then(|id| inner.suppliers.get(&id).cloned());
                OrderDetails {
                    order,
                    items,
                    user,
                    supplier,
                }
            })
            .collect())
    }
}
