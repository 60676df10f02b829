use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockroom_core::DomainError;
use stockroom_infra::StoreError;

/// The single error envelope every failure path uses.
pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Boundary translation: domain failures → transport status codes.
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::Duplicate(field) => json_error(
            StatusCode::BAD_REQUEST,
            "duplicate",
            format!("{field} already exists"),
        ),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound(kind) => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("{} not found", capitalize(&kind)),
        ),
        DomainError::Unauthorized => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized")
        }
        DomainError::Forbidden => json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "administrator role required",
        ),
    }
}

/// Boundary translation: store failures → transport status codes.
pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound(kind) => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("{} not found", capitalize(kind)),
        ),
        StoreError::Duplicate(field) => json_error(
            StatusCode::BAD_REQUEST,
            "duplicate",
            format!("{field} already exists"),
        ),
        StoreError::InsufficientStock { .. } => {
            json_error(StatusCode::BAD_REQUEST, "insufficient_stock", "Insufficient stock")
        }
        StoreError::Constraint { hint } => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "constraint_violation",
            hint,
        ),
        StoreError::Decode(msg) => {
            tracing::error!(error = %msg, "failed to decode stored row");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "server_error", "Server Error")
        }
        StoreError::Database(e) => {
            tracing::error!(error = %e, "database failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "server_error", "Server Error")
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
