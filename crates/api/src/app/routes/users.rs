use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use stockroom_auth::{hash_password, Role};
use stockroom_core::UserId;
use stockroom_users::{NewUser, User, UserUpdate};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::middleware::{self, AuthState};

/// All user management is admin-only.
pub fn router(auth_state: AuthState) -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route_layer(axum::middleware::from_fn(middleware::require_admin))
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store.list_users().await {
        Ok(users) => {
            let items = users.iter().map(dto::user_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id")
        }
    };

    match services.store.get_user(id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "User not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateUserRequest>,
) -> axum::response::Response {
    let input = NewUser {
        name: body.name.unwrap_or_default(),
        address: body.address.unwrap_or_default(),
        email: body.email.unwrap_or_default(),
        password: body.password.unwrap_or_default(),
        role: body.role.unwrap_or(Role::Client),
    };

    if let Err(e) = input.validate() {
        return errors::domain_error_to_response(e);
    }

    match services.store.get_user_by_email(&input.email).await {
        Ok(Some(_)) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "duplicate", "email already exists")
        }
        Ok(None) => {}
        Err(e) => return errors::store_error_to_response(e),
    }

    let password_hash = match hash_password(&input.password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!(error = %e, "password hashing failed");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "server_error",
                "Server Error",
            );
        }
    };

    let now = Utc::now();
    let user = User {
        id: UserId::new(),
        name: input.name,
        address: input.address,
        email: input.email,
        password_hash,
        role: input.role,
        created_at: now,
        updated_at: now,
    };

    match services.store.insert_user(&user).await {
        Ok(()) => (StatusCode::CREATED, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateUserRequest>,
) -> axum::response::Response {
    let id: UserId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id")
        }
    };

    let update = UserUpdate {
        name: body.name,
        address: body.address,
        email: body.email,
        password: body.password,
        role: body.role,
    };

    if let Err(e) = update.validate() {
        return errors::domain_error_to_response(e);
    }

    let mut user = match services.store.get_user(id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "User not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Some(email) = &update.email {
        if *email != user.email {
            match services.store.get_user_by_email(email).await {
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

    if let Some(name) = update.name {
        user.name = name;
    }
    if let Some(address) = update.address {
        user.address = address;
    }
    if let Some(email) = update.email {
        user.email = email;
    }
    if let Some(role) = update.role {
        user.role = role;
    }
    if let Some(password) = update.password {
        user.password_hash = match hash_password(&password) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::error!(error = %e, "password hashing failed");
                return errors::json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "server_error",
                    "Server Error",
                );
            }
        };
    }
    user.updated_at = Utc::now();

    match services.store.update_user(&user).await {
        Ok(()) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id")
        }
    };

    match services.store.delete_user(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "id": id.to_string(), "deleted": true })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
