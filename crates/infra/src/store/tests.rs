use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use stockroom_auth::Role;
use stockroom_core::{OrderId, ProductId, SupplierId, UserId};
use stockroom_orders::{Order, OrderLine};
use stockroom_products::Product;
use stockroom_suppliers::Supplier;
use stockroom_users::User;

use super::{InMemoryStore, Store, StoreError};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn test_user(email: &str) -> User {
    let now = Utc::now();
    User {
        id: UserId::new(),
        name: "Alex Costa".into(),
        address: "12 Dock Road".into(),
        email: email.into(),
        password_hash: "$argon2id$stub".into(),
        role: Role::Client,
        created_at: now,
        updated_at: now,
    }
}

fn test_supplier(email: &str, phone: &str) -> Supplier {
    let now = Utc::now();
    Supplier {
        id: SupplierId::new(),
        name: "Helder Lighting".into(),
        address: "4 Quay Street".into(),
        company: "Helder Lda".into(),
        email: email.into(),
        phone: phone.into(),
        created_at: now,
        updated_at: now,
    }
}

fn test_product(serial: &str, stock: i64) -> Product {
    let now = Utc::now();
    Product {
        id: ProductId::new(),
        name: "Lamp PH-2".into(),
        description: "Warm-white desk lamp".into(),
        serial_number: serial.into(),
        price: dec("10.99"),
        stock,
        created_at: now,
        updated_at: now,
    }
}

fn client_order(user_id: UserId) -> Order {
    let now = Utc::now();
    Order {
        id: OrderId::new(),
        date: now,
        ship_date: None,
        status: "PENDING".into(),
        order_type: "SALE".into(),
        user_id: Some(user_id),
        supplier_id: None,
        created_at: now,
    }
}

fn line(product_id: ProductId, quantity: i64) -> OrderLine {
    OrderLine {
        product_id,
        quantity,
        unit_price: dec("10.99"),
    }
}

#[tokio::test]
async fn place_order_decrements_stock_and_creates_items() {
    let store = InMemoryStore::new();
    let supplier = test_supplier("sales@helder.example", "+351210000000");
    store.insert_supplier(&supplier).await.unwrap();

    let product = test_product("ODS241", 100);
    store.insert_product(&product, &[supplier.id]).await.unwrap();

    let user = test_user("alex@example.com");
    store.insert_user(&user).await.unwrap();

    let order = client_order(user.id);
    let placed = store
        .place_order(&order, &[line(product.id, 5)])
        .await
        .unwrap();

    assert_eq!(placed.items.len(), 1);
    assert_eq!(placed.items[0].quantity, 5);

    let stored = store.get_product(product.id).await.unwrap().unwrap();
    assert_eq!(stored.stock, 95);

    let fetched = store.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(fetched.items.len(), 1);
}

#[tokio::test]
async fn short_stock_rejects_the_whole_order() {
    let store = InMemoryStore::new();
    let supplier = test_supplier("sales@helder.example", "+351210000000");
    store.insert_supplier(&supplier).await.unwrap();

    let plenty = test_product("ODS241", 100);
    let short = test_product("KLSD4", 3);
    store.insert_product(&plenty, &[supplier.id]).await.unwrap();
    store.insert_product(&short, &[supplier.id]).await.unwrap();

    let user = test_user("alex@example.com");
    store.insert_user(&user).await.unwrap();

    let order = client_order(user.id);
    let err = store
        .place_order(&order, &[line(plenty.id, 10), line(short.id, 5)])
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::InsufficientStock { product_id } if product_id == short.id));

    // All-or-nothing: the first line's decrement must have rolled back too.
    assert_eq!(store.get_product(plenty.id).await.unwrap().unwrap().stock, 100);
    assert_eq!(store.get_product(short.id).await.unwrap().unwrap().stock, 3);
    assert!(store.get_order(order.id).await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_product_fails_placement() {
    let store = InMemoryStore::new();
    let user = test_user("alex@example.com");
    store.insert_user(&user).await.unwrap();

    let order = client_order(user.id);
    let err = store
        .place_order(&order, &[line(ProductId::new(), 1)])
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::NotFound("product")));
    assert!(store.get_order(order.id).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_an_order_cascades_and_is_not_repeatable() {
    let store = InMemoryStore::new();
    let supplier = test_supplier("sales@helder.example", "+351210000000");
    store.insert_supplier(&supplier).await.unwrap();
    let product = test_product("ODS241", 10);
    store.insert_product(&product, &[supplier.id]).await.unwrap();
    let user = test_user("alex@example.com");
    store.insert_user(&user).await.unwrap();

    let order = client_order(user.id);
    store.place_order(&order, &[line(product.id, 1)]).await.unwrap();

    store.delete_order(order.id).await.unwrap();
    assert!(store.get_order(order.id).await.unwrap().is_none());

    // NotFound on every further attempt.
    for _ in 0..2 {
        let err = store.delete_order(order.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound("order")));
    }
}

#[tokio::test]
async fn duplicate_user_email_is_rejected() {
    let store = InMemoryStore::new();
    store.insert_user(&test_user("alex@example.com")).await.unwrap();

    let err = store
        .insert_user(&test_user("alex@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Duplicate("email")));
}

#[tokio::test]
async fn client_products_are_deduplicated_per_order_only() {
    let store = InMemoryStore::new();
    let supplier = test_supplier("sales@helder.example", "+351210000000");
    store.insert_supplier(&supplier).await.unwrap();
    let product = test_product("ODS241", 100);
    store.insert_product(&product, &[supplier.id]).await.unwrap();
    let user = test_user("alex@example.com");
    store.insert_user(&user).await.unwrap();

    // Same product twice within one order, then again in a second order.
    let first = client_order(user.id);
    store
        .place_order(&first, &[line(product.id, 1), line(product.id, 2)])
        .await
        .unwrap();
    let second = client_order(user.id);
    store.place_order(&second, &[line(product.id, 3)]).await.unwrap();

    let products = store.products_by_client(user.id).await.unwrap();
    assert_eq!(products.len(), 2, "once per order, not globally unique");
}

#[tokio::test]
async fn orders_between_is_inclusive_and_nested() {
    let store = InMemoryStore::new();
    let supplier = test_supplier("sales@helder.example", "+351210000000");
    store.insert_supplier(&supplier).await.unwrap();
    let product = test_product("ODS241", 100);
    store.insert_product(&product, &[supplier.id]).await.unwrap();
    let user = test_user("alex@example.com");
    store.insert_user(&user).await.unwrap();

    let order = client_order(user.id);
    store.place_order(&order, &[line(product.id, 1)]).await.unwrap();

    let window_start = order.created_at - Duration::hours(1);
    let window_end = order.created_at + Duration::hours(1);

    let details = store.orders_between(window_start, window_end).await.unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].items.len(), 1);
    assert_eq!(details[0].user.as_ref().map(|u| u.id), Some(user.id));
    assert!(details[0].supplier.is_none());

    // A window that ends before the order was created excludes it.
    let earlier = store
        .orders_between(window_start, order.created_at - Duration::minutes(1))
        .await
        .unwrap();
    assert!(earlier.is_empty());
}

#[tokio::test]
async fn restock_applies_any_signed_delta() {
    let store = InMemoryStore::new();
    let supplier = test_supplier("sales@helder.example", "+351210000000");
    store.insert_supplier(&supplier).await.unwrap();
    let product = test_product("ODS241", 10);
    store.insert_product(&product, &[supplier.id]).await.unwrap();

    let restocked = store.adjust_stock(product.id, 15).await.unwrap();
    assert_eq!(restocked.stock, 25);

    // The restock path is deliberately unguarded.
    let drained = store.adjust_stock(product.id, -30).await.unwrap();
    assert_eq!(drained.stock, -5);

    let err = store.adjust_stock(ProductId::new(), 1).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound("product")));
}
