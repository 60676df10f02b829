use axum::Router;

use crate::middleware::AuthState;

pub mod auth;
pub mod orders;
pub mod products;
pub mod suppliers;
pub mod system;
pub mod users;

/// Router for everything under `/api/v1`. Each record family wires its own
/// auth layers, matching the per-route protection table.
pub fn router(auth_state: AuthState) -> Router {
    Router::new()
        .merge(auth::router())
        .nest("/users", users::router(auth_state.clone()))
        .nest("/suppliers", suppliers::router(auth_state.clone()))
        .nest("/products", products::router(auth_state.clone()))
        .nest("/orders", orders::router(auth_state))
}
