use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;

use stockroom_auth::{hash_password, verify_password, Role};
use stockroom_core::UserId;
use stockroom_users::{NewUser, User};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let user = match services.store.get_user_by_email(&body.email).await {
        Ok(user) => user,
        Err(e) => return errors::store_error_to_response(e),
    };

    let Some(user) = user else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_credentials", "User not found");
    };

    match verify_password(&body.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_credentials",
                "Invalid password",
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "password comparison failed");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "server_error",
                "Server Error",
            );
        }
    }

    let token = match services.tokens.issue(user.id) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "token signing failed");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "server_error",
                "Server Error",
            );
        }
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "user": dto::user_to_json(&user),
            "token": token,
        })),
    )
        .into_response()
}

/// Self-service registration always creates a CLIENT.
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    let input = NewUser {
        name: body.name.unwrap_or_default(),
        address: body.address.unwrap_or_default(),
        email: body.email.unwrap_or_default(),
        password: body.password.unwrap_or_default(),
        role: Role::Client,
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

    if let Err(e) = services.store.insert_user(&user).await {
        return errors::store_error_to_response(e);
    }

    let token = match services.tokens.issue(user.id) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "token signing failed");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "server_error",
                "Server Error",
            );
        }
    };

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "user": dto::user_to_json(&user),
            "token": token,
        })),
    )
        .into_response()
}
