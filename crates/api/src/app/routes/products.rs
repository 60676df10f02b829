use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;

use stockroom_core::{ProductId, SupplierId, UserId};
use stockroom_products::{NewProduct, Product, ProductUpdate};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::middleware::{self, AuthState};

/// Reads are public; writes need bearer + admin. The layers wrap only the
/// write methods (admin inner, auth outer).
pub fn router(auth_state: AuthState) -> Router {
    let auth = axum::middleware::from_fn_with_state(auth_state, middleware::auth_middleware);
    let admin = axum::middleware::from_fn(middleware::require_admin);

    Router::new()
        .route(
            "/",
            post(create_product)
                .layer(admin.clone())
                .layer(auth.clone())
                .get(list_products),
        )
        .route(
            "/:id",
            put(update_product)
                .delete(delete_product)
                .layer(admin)
                .layer(auth)
                .get(get_product),
        )
        .route("/supplier/:id", get(products_by_supplier))
        .route("/client/:id", get(products_by_client))
        .route("/stock/:id", get(product_stock_detail))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store.list_products().await {
        Ok(products) => {
            let items = products.iter().map(dto::product_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
        }
    };

    match services.store.get_product(id).await {
        Ok(Some(product)) => (StatusCode::OK, Json(dto::product_to_json(&product))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "Product not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn products_by_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SupplierId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid supplier id")
        }
    };

    match services.store.products_by_supplier(id).await {
        Ok(products) => {
            let items = products.iter().map(dto::product_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn products_by_client(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid client id")
        }
    };

    match services.store.products_by_client(id).await {
        Ok(products) => {
            let items = products.iter().map(dto::product_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn product_stock_detail(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
        }
    };

    match services.store.product_with_suppliers(id).await {
        Ok(Some(detail)) => (
            StatusCode::OK,
            Json(dto::product_with_suppliers_to_json(&detail)),
        )
            .into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "Product not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    let Some(price) = body.price else {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "price is required");
    };

    let input = NewProduct {
        name: body.name.unwrap_or_default(),
        description: body.description.unwrap_or_default(),
        serial_number: body.serial_number.unwrap_or_default(),
        price,
        stock: body.stock.unwrap_or(0),
        supplier_ids: body.suppliers.unwrap_or_default(),
    };

    if let Err(e) = input.validate() {
        return errors::domain_error_to_response(e);
    }

    // Name exactly the supplier ids that do not exist.
    match services.store.missing_suppliers(&input.supplier_ids).await {
        Ok(missing) if !missing.is_empty() => {
            let ids = missing
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "unknown_supplier",
                format!("suppliers do not exist: {ids}"),
            );
        }
        Ok(_) => {}
        Err(e) => return errors::store_error_to_response(e),
    }

    match services
        .store
        .get_product_by_serial(&input.serial_number)
        .await
    {
        Ok(Some(_)) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "duplicate",
                "serial number already exists",
            )
        }
        Ok(None) => {}
        Err(e) => return errors::store_error_to_response(e),
    }

    let now = Utc::now();
    let product = Product {
        id: ProductId::new(),
        name: input.name,
        description: input.description,
        serial_number: input.serial_number,
        price: input.price,
        stock: input.stock,
        created_at: now,
        updated_at: now,
    };

    match services
        .store
        .insert_product(&product, &input.supplier_ids)
        .await
    {
        Ok(()) => (StatusCode::CREATED, Json(dto::product_to_json(&product))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateProductRequest>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
        }
    };

    let update = ProductUpdate {
        name: body.name,
        description: body.description,
        serial_number: body.serial_number,
        price: body.price,
        stock: body.stock,
        supplier_ids: body.suppliers,
    };

    if let Err(e) = update.validate() {
        return errors::domain_error_to_response(e);
    }

    let mut product = match services.store.get_product(id).await {
        Ok(Some(product)) => product,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "Product not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Some(serial) = &update.serial_number {
        if *serial != product.serial_number {
            match services.store.get_product_by_serial(serial).await {
                Ok(Some(_)) => {
                    return errors::json_error(
                        StatusCode::BAD_REQUEST,
                        "duplicate",
                        "serial number already exists",
                    )
                }
                Ok(None) => {}
                Err(e) => return errors::store_error_to_response(e),
            }
        }
    }

    if let Some(supplier_ids) = &update.supplier_ids {
        match services.store.missing_suppliers(supplier_ids).await {
            Ok(missing) if !missing.is_empty() => {
                let ids = missing
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "unknown_supplier",
                    format!("suppliers do not exist: {ids}"),
                );
            }
            Ok(_) => {}
            Err(e) => return errors::store_error_to_response(e),
        }
    }

    if let Some(name) = update.name {
        product.name = name;
    }
    if let Some(description) = update.description {
        product.description = description;
    }
    if let Some(serial) = update.serial_number {
        product.serial_number = serial;
    }
    if let Some(price) = update.price {
        product.price = price;
    }
    if let Some(stock) = update.stock {
        product.stock = stock;
    }
    product.updated_at = Utc::now();

    match services
        .store
        .update_product(&product, update.supplier_ids.as_deref())
        .await
    {
        Ok(()) => (StatusCode::OK, Json(dto::product_to_json(&product))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
        }
    };

    match services.store.delete_product(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "id": id.to_string(), "deleted": true })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
