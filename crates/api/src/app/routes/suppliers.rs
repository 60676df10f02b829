use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{post, put},
    Json, Router,
};
use chrono::Utc;

use stockroom_core::SupplierId;
use stockroom_suppliers::{NewSupplier, Supplier, SupplierUpdate};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::middleware::{self, AuthState};

/// Reads need a bearer token; writes additionally need the admin role.
///
/// The admin gate wraps the write methods only, then the auth layer wraps
/// every method, so auth always runs first.
pub fn router(auth_state: AuthState) -> Router {
    let auth = axum::middleware::from_fn_with_state(auth_state, middleware::auth_middleware);
    let admin = axum::middleware::from_fn(middleware::require_admin);

    Router::new()
        .route(
            "/",
            post(create_supplier)
                .layer(admin.clone())
                .get(list_suppliers)
                .layer(auth.clone()),
        )
        .route(
            "/:id",
            put(update_supplier)
                .delete(delete_supplier)
                .layer(admin)
                .get(get_supplier)
                .layer(auth),
        )
}

pub async fn list_suppliers(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store.list_suppliers().await {
        Ok(suppliers) => {
            let items = suppliers.iter().map(dto::supplier_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SupplierId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid supplier id")
        }
    };

    match services.store.get_supplier(id).await {
        Ok(Some(supplier)) => {
            (StatusCode::OK, Json(dto::supplier_to_json(&supplier))).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "Supplier not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateSupplierRequest>,
) -> axum::response::Response {
    let input = NewSupplier {
        name: body.name.unwrap_or_default(),
        address: body.address.unwrap_or_default(),
        company: body.company.unwrap_or_default(),
        email: body.email.unwrap_or_default(),
        phone: body.phone.unwrap_or_default(),
    };

    if let Err(e) = input.validate() {
        return errors::domain_error_to_response(e);
    }

    match services.store.get_supplier_by_email(&input.email).await {
        Ok(Some(_)) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "duplicate", "email already exists")
        }
        Ok(None) => {}
        Err(e) => return errors::store_error_to_response(e),
    }
    match services.store.get_supplier_by_phone(&input.phone).await {
        Ok(Some(_)) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "duplicate", "phone already exists")
        }
        Ok(None) => {}
        Err(e) => return errors::store_error_to_response(e),
    }

    let now = Utc::now();
    let supplier = Supplier {
        id: SupplierId::new(),
        name: input.name,
        address: input.address,
        company: input.company,
        email: input.email,
        phone: input.phone,
        created_at: now,
        updated_at: now,
    };

    match services.store.insert_supplier(&supplier).await {
        Ok(()) => (StatusCode::CREATED, Json(dto::supplier_to_json(&supplier))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateSupplierRequest>,
) -> axum::response::Response {
    let id: SupplierId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid supplier id")
        }
    };

    let update = SupplierUpdate {
        name: body.name,
        address: body.address,
        company: body.company,
        email: body.email,
        phone: body.phone,
    };

    if let Err(e) = update.validate() {
        return errors::domain_error_to_response(e);
    }

    let mut supplier = match services.store.get_supplier(id).await {
        Ok(Some(supplier)) => supplier,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "Supplier not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Some(email) = &update.email {
        if *email != supplier.email {
            match services.store.get_supplier_by_email(email).await {
                Ok(Some(_)) => {
                    return errors::json_error(
                        StatusCode::BAD_REQUEST,
                        "duplicate",
                        "email already exists",
                    )
                }
                Ok(None) => {}
                Err(e) => return errors::store_error_to_response(e),
            }
        }
    }
    if let Some(phone) = &update.phone {
        if *phone != supplier.phone {
            match services.store.get_supplier_by_phone(phone).await {
                Ok(Some(_)) => {
                    return errors::json_error(
                        StatusCode::BAD_REQUEST,
                        "duplicate",
                        "phone already exists",
                    )
                }
                Ok(None) => {}
                Err(e) => return errors::store_error_to_response(e),
            }
        }
    }

    if let Some(name) = update.name {
        supplier.name = name;
    }
    if let Some(address) = update.address {
        supplier.address = address;
    }
    if let Some(company) = update.company {
        supplier.company = company;
    }
    if let Some(email) = update.email {
        supplier.email = email;
    }
    if let Some(phone) = update.phone {
        supplier.phone = phone;
    }
    supplier.updated_at = Utc::now();

    match services.store.update_supplier(&supplier).await {
        Ok(()) => (StatusCode::OK, Json(dto::supplier_to_json(&supplier))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SupplierId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid supplier id")
        }
    };

    match services.store.delete_supplier(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "id": id.to_string(), "deleted": true })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
