//! HTTP API application wiring (Axum router + service wiring).
//!
//! Folder layout:
//! - `services.rs`: the handle handlers work through (store + token service)
//! - `routes/`: HTTP routes + handlers (one file per record family)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(services: Arc<services::AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        services: services.clone(),
    };

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api/v1", routes::router(auth_state))
        .layer(Extension(services))
}
