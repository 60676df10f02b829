use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use stockroom_api::app::services::AppServices;
use stockroom_auth::{hash_password, AccessClaims, Role, TokenService};
use stockroom_core::{OrderId, ProductId, SupplierId, UserId};
use stockroom_infra::{InMemoryStore, Store};
use stockroom_products::Product;
use stockroom_suppliers::Supplier;
use stockroom_users::User;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    services: Arc<AppServices>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, but over the in-memory store and an
        // ephemeral port.
        let services = Arc::new(AppServices::new(
            Arc::new(InMemoryStore::new()),
            TokenService::new(JWT_SECRET.as_bytes()),
        ));
        let app = stockroom_api::app::build_app(services.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            services,
            handle,
        }
    }

    fn api(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    async fn seed_user(&self, email: &str, password: &str, role: Role) -> (User, String) {
        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            name: "Alex Costa".into(),
            address: "12 Dock Road".into(),
            email: email.into(),
            password_hash: hash_password(password).unwrap(),
            role,
            created_at: now,
            updated_at: now,
        };
        self.services.store.insert_user(&user).await.unwrap();
        let token = self.services.tokens.issue(user.id).unwrap();
        (user, token)
    }

    async fn seed_supplier(&self) -> Supplier {
        let now = Utc::now();
        let supplier = Supplier {
            id: SupplierId::new(),
            name: "Helder Lighting".into(),
            address: "4 Quay Street".into(),
            company: "Helder Lda".into(),
            email: format!("{}@helder.example", SupplierId::new()),
            phone: format!("+3512{}", now.timestamp_micros()),
            created_at: now,
            updated_at: now,
        };
        self.services.store.insert_supplier(&supplier).await.unwrap();
        supplier
    }

    async fn seed_product(&self, supplier: &Supplier, stock: i64) -> Product {
        let now = Utc::now();
        let product = Product {
            id: ProductId::new(),
            name: "Lamp PH-2".into(),
            description: "Warm-white desk lamp".into(),
            serial_number: format!("SN-{}", ProductId::new()),
            price: "10.99".parse().unwrap(),
            stock,
            created_at: now,
            updated_at: now,
        };
        self.services
            .store
            .insert_product(&product, &[supplier.id])
            .await
            .unwrap();
        product
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn login_round_trips_the_token_and_never_leaks_the_password() {
    let srv = TestServer::spawn().await;
    let (user, _) = srv.seed_user("alex@example.com", "Cl1ent#pw", Role::Client).await;

    let client = reqwest::Client::new();
    let res = client
        .post(srv.api("/login"))
        .json(&json!({ "email": "alex@example.com", "password": "Cl1ent#pw" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();

    // The token's decoded subject matches the stored user id.
    let token = body["token"].as_str().unwrap();
    assert_eq!(srv.services.tokens.verify(token).unwrap(), user.id);

    // No password material anywhere in the response.
    let raw = serde_json::to_string(&body).unwrap();
    assert!(!raw.to_lowercase().contains("password"));
    assert_eq!(body["user"]["email"], "alex@example.com");
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let srv = TestServer::spawn().await;
    srv.seed_user("alex@example.com", "Cl1ent#pw", Role::Client).await;

    let client = reqwest::Client::new();
    let res = client
        .post(srv.api("/login"))
        .json(&json!({ "email": "alex@example.com", "password": "Wrong#pw" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_credentials");
}

#[tokio::test]
async fn register_creates_a_client_and_logs_them_in() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .post(srv.api("/register"))
        .json(&json!({
            "name": "Marta Reis",
            "address": "77 Mill Lane",
            "email": "marta@example.com",
            "password": "S3cret#pw",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user"]["role"], "CLIENT");
    assert!(body["token"].is_string());

    // Weak passwords never make it through registration.
    let res = client
        .post(srv.api("/register"))
        .json(&json!({
            "name": "Weak",
            "address": "1 Short Street",
            "email": "weak@example.com",
            "password": "alllowercase",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn user_management_requires_bearer_and_admin_role() {
    let srv = TestServer::spawn().await;
    let (_, client_token) = srv.seed_user("alex@example.com", "Cl1ent#pw", Role::Client).await;
    let (_, admin_token) = srv.seed_user("root@example.com", "Adm1n#pw", Role::Administrator).await;

    let client = reqwest::Client::new();

    let res = client.get(srv.api("/users")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "No token provided");

    let res = client
        .get(srv.api("/users"))
        .bearer_auth(&client_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(srv.api("/users"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn bad_tokens_are_distinguished_from_unknown_subjects() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Expired but correctly signed.
    let expired_claims = AccessClaims::issue(
        UserId::new(),
        Utc::now() - ChronoDuration::hours(stockroom_auth::TOKEN_TTL_HOURS + 1),
    );
    let expired = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &expired_claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();

    let res = client
        .get(srv.api("/suppliers"))
        .bearer_auth(&expired)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Token invalid or expired");

    // Valid signature, but the subject does not exist in storage.
    let ghost = srv.services.tokens.issue(UserId::new()).unwrap();
    let res = client
        .get(srv.api("/suppliers"))
        .bearer_auth(&ghost)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Token invalid");
}

#[tokio::test]
async fn supplier_round_trips_through_create_and_fetch() {
    let srv = TestServer::spawn().await;
    let (_, client_token) = srv.seed_user("alex@example.com", "Cl1ent#pw", Role::Client).await;
    let (_, admin_token) = srv.seed_user("root@example.com", "Adm1n#pw", Role::Administrator).await;

    let client = reqwest::Client::new();
    let res = client
        .post(srv.api("/suppliers"))
        .bearer_auth(&admin_token)
        .json(&json!({
            "name": "Helder Lighting",
            "address": "4 Quay Street",
            "company": "Helder Lda",
            "email": "sales@helder.example",
            "phone": "+351210000000",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["id"].as_str().unwrap();

    let res = client
        .get(srv.api(&format!("/suppliers/{id}")))
        .bearer_auth(&client_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: serde_json::Value = res.json().await.unwrap();

    for field in ["name", "address", "company", "email", "phone"] {
        assert_eq!(fetched[field], created[field], "field {field} must round-trip");
    }

    // Duplicate phone on a second create is called out.
    let res = client
        .post(srv.api("/suppliers"))
        .bearer_auth(&admin_token)
        .json(&json!({
            "name": "Other",
            "address": "5 Quay Street",
            "company": "Other Lda",
            "email": "other@helder.example",
            "phone": "+351210000000",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn product_create_names_exactly_the_missing_suppliers() {
    let srv = TestServer::spawn().await;
    let (_, admin_token) = srv.seed_user("root@example.com", "Adm1n#pw", Role::Administrator).await;
    let known = srv.seed_supplier().await;

    let ghost_a = SupplierId::new();
    let ghost_b = SupplierId::new();

    let client = reqwest::Client::new();
    let res = client
        .post(srv.api("/products"))
        .bearer_auth(&admin_token)
        .json(&json!({
            "name": "Lamp PH-2",
            "description": "Warm-white desk lamp",
            "serialNumber": "ODS241",
            "price": 10.99,
            "stock": 100,
            "suppliers": [known.id.to_string(), ghost_a.to_string(), ghost_b.to_string()],
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unknown_supplier");

    let message = body["message"].as_str().unwrap();
    assert!(message.contains(&ghost_a.to_string()));
    assert!(message.contains(&ghost_b.to_string()));
    assert!(!message.contains(&known.id.to_string()));
}

#[tokio::test]
async fn placing_an_order_decrements_stock_and_creates_one_item() {
    let srv = TestServer::spawn().await;
    let (user, token) = srv.seed_user("alex@example.com", "Cl1ent#pw", Role::Client).await;
    let supplier = srv.seed_supplier().await;
    let product = srv.seed_product(&supplier, 100).await;

    let client = reqwest::Client::new();
    let res = client
        .post(srv.api("/orders"))
        .bearer_auth(&token)
        .json(&json!({
            "supplierId": null,
            "products": [
                { "productId": product.id.to_string(), "quantity": 5, "unitPrice": 10.99 }
            ],
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["userId"], user.id.to_string());
    assert!(body["supplierId"].is_null());

    let items = body["orderItems"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 5);

    let res = client
        .get(srv.api(&format!("/products/{}", product.id)))
        .send()
        .await
        .unwrap();
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched["stock"], 95);
}

#[tokio::test]
async fn short_stock_rejects_the_order_and_leaves_nothing_behind() {
    let srv = TestServer::spawn().await;
    let (_, token) = srv.seed_user("alex@example.com", "Cl1ent#pw", Role::Client).await;
    let supplier = srv.seed_supplier().await;
    let product = srv.seed_product(&supplier, 3).await;

    let client = reqwest::Client::new();
    let res = client
        .post(srv.api("/orders"))
        .bearer_auth(&token)
        .json(&json!({
            "products": [
                { "productId": product.id.to_string(), "quantity": 5, "unitPrice": 10.99 }
            ],
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "insufficient_stock");
    assert_eq!(body["message"], "Insufficient stock");

    // All-or-nothing: stock untouched, no order persisted.
    let res = client
        .get(srv.api(&format!("/products/{}", product.id)))
        .send()
        .await
        .unwrap();
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched["stock"], 3);

    let res = client.get(srv.api("/orders")).send().await.unwrap();
    let orders: serde_json::Value = res.json().await.unwrap();
    assert!(orders["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn naming_both_recipients_is_a_validation_error() {
    let srv = TestServer::spawn().await;
    let (user, token) = srv.seed_user("alex@example.com", "Cl1ent#pw", Role::Client).await;
    let supplier = srv.seed_supplier().await;
    let product = srv.seed_product(&supplier, 10).await;

    let client = reqwest::Client::new();
    let res = client
        .post(srv.api("/orders"))
        .bearer_auth(&token)
        .json(&json!({
            "supplierId": supplier.id.to_string(),
            "userId": user.id.to_string(),
            "products": [
                { "productId": product.id.to_string(), "quantity": 1, "unitPrice": 10.99 }
            ],
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["message"],
        "Order must be either to a supplier or a client, not both"
    );
}

#[tokio::test]
async fn deleting_a_nonexistent_order_is_not_found_every_time() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let ghost = OrderId::new();

    for _ in 0..2 {
        let res = client
            .delete(srv.api(&format!("/orders/{ghost}")))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn date_range_listing_is_admin_only_and_nests_details() {
    let srv = TestServer::spawn().await;
    let (user, client_token) = srv.seed_user("alex@example.com", "Cl1ent#pw", Role::Client).await;
    let (_, admin_token) = srv.seed_user("root@example.com", "Adm1n#pw", Role::Administrator).await;
    let supplier = srv.seed_supplier().await;
    let product = srv.seed_product(&supplier, 50).await;

    let client = reqwest::Client::new();
    let res = client
        .post(srv.api("/orders"))
        .bearer_auth(&client_token)
        .json(&json!({
            "products": [
                { "productId": product.id.to_string(), "quantity": 2, "unitPrice": 10.99 }
            ],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let yesterday = (Utc::now() - ChronoDuration::days(1)).format("%Y-%m-%d");
    let tomorrow = (Utc::now() + ChronoDuration::days(1)).format("%Y-%m-%d");

    // Admin-only.
    let res = client
        .get(srv.api(&format!("/orders/{yesterday}/{tomorrow}")))
        .bearer_auth(&client_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(srv.api(&format!("/orders/{yesterday}/{tomorrow}")))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["orderItems"].as_array().unwrap().len(), 1);
    assert_eq!(items[0]["user"]["id"], user.id.to_string());
    assert!(items[0]["supplier"].is_null());

    // A window before the order excludes it.
    let week_ago = (Utc::now() - ChronoDuration::days(7)).format("%Y-%m-%d");
    let res = client
        .get(srv.api(&format!("/orders/{week_ago}/{yesterday}")))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn restock_adds_the_delta_and_is_admin_only() {
    let srv = TestServer::spawn().await;
    let (_, admin_token) = srv.seed_user("root@example.com", "Adm1n#pw", Role::Administrator).await;
    let supplier = srv.seed_supplier().await;
    let product = srv.seed_product(&supplier, 10).await;

    let client = reqwest::Client::new();

    let res = client
        .put(srv.api(&format!("/orders/{}/15", product.id)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .put(srv.api(&format!("/orders/{}/15", product.id)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["stock"], 25);
}
