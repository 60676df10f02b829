use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use stockroom_auth::Role;
use stockroom_core::{ProductId, SupplierId, UserId};
use stockroom_infra::{OrderDetails, OrderWithItems};
use stockroom_orders::{Order, OrderItem};
use stockroom_products::{Product, ProductWithSuppliers};
use stockroom_suppliers::Supplier;
use stockroom_users::User;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// Creation bodies keep every field optional so that a missing field surfaces
// as a descriptive validation 400 rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSupplierRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSupplierRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub serial_number: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
    pub suppliers: Option<Vec<SupplierId>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub serial_number: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
    pub suppliers: Option<Vec<SupplierId>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub supplier_id: Option<SupplierId>,
    pub user_id: Option<UserId>,
    pub status: Option<String>,
    pub order_type: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub ship_date: Option<DateTime<Utc>>,
    pub products: Vec<OrderLineRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub date: Option<DateTime<Utc>>,
    pub ship_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub order_type: Option<String>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

/// The password hash never leaves this mapping.
pub fn user_to_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id.to_string(),
        "name": user.name,
        "address": user.address,
        "email": user.email,
        "role": user.role.as_str(),
        "createdAt": user.created_at.to_rfc3339(),
        "updatedAt": user.updated_at.to_rfc3339(),
    })
}

pub fn supplier_to_json(supplier: &Supplier) -> serde_json::Value {
    serde_json::json!({
        "id": supplier.id.to_string(),
        "name": supplier.name,
        "address": supplier.address,
        "company": supplier.company,
        "email": supplier.email,
        "phone": supplier.phone,
        "createdAt": supplier.created_at.to_rfc3339(),
        "updatedAt": supplier.updated_at.to_rfc3339(),
    })
}

pub fn product_to_json(product: &Product) -> serde_json::Value {
    serde_json::json!({
        "id": product.id.to_string(),
        "name": product.name,
        "description": product.description,
        "serialNumber": product.serial_number,
        "price": product.price,
        "stock": product.stock,
        "createdAt": product.created_at.to_rfc3339(),
        "updatedAt": product.updated_at.to_rfc3339(),
    })
}

pub fn product_with_suppliers_to_json(detail: &ProductWithSuppliers) -> serde_json::Value {
    let mut value = product_to_json(&detail.product);
    value["suppliers"] = detail.suppliers.iter().map(supplier_to_json).collect();
    value
}

pub fn order_to_json(order: &Order) -> serde_json::Value {
    serde_json::json!({
        "id": order.id.to_string(),
        "date": order.date.to_rfc3339(),
        "shipDate": order.ship_date.map(|d| d.to_rfc3339()),
        "status": order.status,
        "orderType": order.order_type,
        "userId": order.user_id.map(|id| id.to_string()),
        "supplierId": order.supplier_id.map(|id| id.to_string()),
        "createdAt": order.created_at.to_rfc3339(),
    })
}

pub fn order_item_to_json(item: &OrderItem) -> serde_json::Value {
    serde_json::json!({
        "id": item.id.to_string(),
        "orderId": item.order_id.to_string(),
        "productId": item.product_id.to_string(),
        "quantity": item.quantity,
        "unitPrice": item.unit_price,
    })
}

pub fn order_with_items_to_json(owi: &OrderWithItems) -> serde_json::Value {
    let mut value = order_to_json(&owi.order);
    value["orderItems"] = owi.items.iter().map(order_item_to_json).collect();
    value
}

pub fn order_details_to_json(details: &OrderDetails) -> serde_json::Value {
    let mut value = order_to_json(&details.order);
    value["orderItems"] = details.items.iter().map(order_item_to_json).collect();
    value["user"] = details
        .user
        .as_ref()
        .map(user_to_json)
        .unwrap_or(serde_json::Value::Null);
    value["supplier"] = details
        .supplier
        .as_ref()
        .map(supplier_to_json)
        .unwrap_or(serde_json::Value::Null);
    value
}
