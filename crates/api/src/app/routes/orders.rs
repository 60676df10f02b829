use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{NaiveDate, Utc};

use stockroom_core::{OrderId, ProductId};
use stockroom_orders::{Order, OrderDraft, OrderLine, OrderRecipient, OrderUpdate};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CurrentUser;
use crate::middleware::{self, AuthState};

/// Reads and delete are public, placement needs a bearer token, the rest is
/// admin-only — mirroring the protection table.
///
/// Path parameter names must agree across overlapping routes (matchit), so
/// the two-segment date-range and restock routes share the `:id/:value`
/// pair.
pub fn router(auth_state: AuthState) -> Router {
    let auth = axum::middleware::from_fn_with_state(auth_state, middleware::auth_middleware);
    let admin = axum::middleware::from_fn(middleware::require_admin);

    Router::new()
        .route(
            "/",
            post(create_order).layer(auth.clone()).get(list_orders),
        )
        .route(
            "/:id",
            put(update_order)
                .layer(admin.clone())
                .layer(auth.clone())
                .get(get_order)
                .delete(delete_order),
        )
        .route(
            "/:id/:value",
            get(orders_by_range)
                .put(restock_product)
                .layer(admin)
                .layer(auth),
        )
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store.list_orders().await {
        Ok(orders) => {
            let items = orders.iter().map(dto::order_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrderId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id")
        }
    };

    match services.store.get_order(id).await {
        Ok(Some(order)) => {
            (StatusCode::OK, Json(dto::order_with_items_to_json(&order))).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "Order not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// The order/stock workflow: resolve the owner, validate the lines, then run
/// the placement as one transaction in the store.
pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<dto::CreateOrderRequest>,
) -> axum::response::Response {
    let recipient = match OrderRecipient::resolve(body.user_id, body.supplier_id, current.id()) {
        Ok(recipient) => recipient,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let now = Utc::now();
    let draft = OrderDraft {
        recipient,
        date: body.date.unwrap_or(now),
        ship_date: body.ship_date,
        status: body.status.unwrap_or_else(|| "PENDING".to_string()),
        order_type: body.order_type.unwrap_or_else(|| {
            match recipient {
                OrderRecipient::Client(_) => "CLIENT",
                OrderRecipient::Supplier(_) => "SUPPLIER",
            }
            .to_string()
        }),
        lines: body
            .products
            .iter()
            .map(|line| OrderLine {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect(),
    };

    if let Err(e) = draft.validate() {
        return errors::domain_error_to_response(e);
    }

    let order = Order {
        id: OrderId::new(),
        date: draft.date,
        ship_date: draft.ship_date,
        status: draft.status.clone(),
        order_type: draft.order_type.clone(),
        user_id: recipient.user_id(),
        supplier_id: recipient.supplier_id(),
        created_at: now,
    };

    match services.store.place_order(&order, &draft.lines).await {
        Ok(placed) => (
            StatusCode::CREATED,
            Json(dto::order_with_items_to_json(&placed)),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateOrderRequest>,
) -> axum::response::Response {
    let id: OrderId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id")
        }
    };

    let update = OrderUpdate {
        date: body.date,
        ship_date: body.ship_date,
        status: body.status,
        order_type: body.order_type,
    };

    if let Err(e) = update.validate() {
        return errors::domain_error_to_response(e);
    }

    let mut order = match services.store.get_order(id).await {
        Ok(Some(owi)) => owi.order,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "Order not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Some(date) = update.date {
        order.date = date;
    }
    if let Some(ship_date) = update.ship_date {
        order.ship_date = Some(ship_date);
    }
    if let Some(status) = update.status {
        order.status = status;
    }
    if let Some(order_type) = update.order_type {
        order.order_type = order_type;
    }

    match services.store.update_order(&order).await {
        Ok(()) => (StatusCode::OK, Json(dto::order_to_json(&order))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrderId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id")
        }
    };

    match services.store.delete_order(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "id": id.to_string(), "deleted": true })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Inclusive date-range read on creation timestamps, nested with items and
/// the owning user/supplier.
pub async fn orders_by_range(
    Extension(services): Extension<Arc<AppServices>>,
    Path((start, end)): Path<(String, String)>,
) -> axum::response::Response {
    let start_date: NaiveDate = match start.parse() {
        Ok(date) => date,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_date",
                "start date must be YYYY-MM-DD",
            )
        }
    };
    let end_date: NaiveDate = match end.parse() {
        Ok(date) => date,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_date",
                "end date must be YYYY-MM-DD",
            )
        }
    };

    let window_start = start_date.and_time(chrono::NaiveTime::MIN).and_utc();
    let Some(window_end) = end_date.and_hms_micro_opt(23, 59, 59, 999_999) else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_date", "end date out of range");
    };

    match services
        .store
        .orders_between(window_start, window_end.and_utc())
        .await
    {
        Ok(details) => {
            let items = details
                .iter()
                .map(dto::order_details_to_json)
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Administrative restock: `stock = stock + delta`, delta may be any
/// integer.
pub async fn restock_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path((product_id, stock_value)): Path<(String, String)>,
) -> axum::response::Response {
    let product_id: ProductId = match product_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
        }
    };
    let delta: i64 = match stock_value.parse() {
        Ok(delta) => delta,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "stock value must be an integer",
            )
        }
    };

    match services.store.adjust_stock(product_id, delta).await {
        Ok(product) => (StatusCode::OK, Json(dto::product_to_json(&product))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
