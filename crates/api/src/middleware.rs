use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::CurrentUser;

#[derive(Clone)]
pub struct AuthState {
    pub services: Arc<AppServices>,
}

/// Bearer authentication: verify the token, load the user, attach it to the
/// request. No token rotation or extension happens here.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).ok_or_else(|| {
        errors::json_error(StatusCode::UNAUTHORIZED, "no_token", "No token provided")
    })?;

    let user_id = state.services.tokens.verify(token).map_err(|_| {
        errors::json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            "Token invalid or expired",
        )
    })?;

    // A signed token whose subject no longer exists is still rejected.
    let user = state
        .services
        .store
        .get_user(user_id)
        .await
        .map_err(errors::store_error_to_response)?
        .ok_or_else(|| {
            errors::json_error(StatusCode::UNAUTHORIZED, "invalid_token", "Token invalid")
        })?;

    req.extensions_mut().insert(CurrentUser::new(user));
    Ok(next.run(req).await)
}

/// Role gate: must run behind [`auth_middleware`], which has already loaded
/// the user for this request.
pub async fn require_admin(
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let current = req.extensions().get::<CurrentUser>().ok_or_else(|| {
        errors::json_error(StatusCode::UNAUTHORIZED, "no_token", "No token provided")
    })?;

    if !current.user().role.is_admin() {
        return Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "administrator role required",
        ));
    }

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        return None;
    }
    Some(token)
}
