//! Service wiring shared by every handler.

use std::sync::Arc;

use stockroom_auth::TokenService;
use stockroom_infra::Store;

/// The handle passed down to handlers: the persistence gateway plus the
/// credential service. Constructed once in `main.rs` (Postgres) or per test
/// (in-memory).
pub struct AppServices {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
}

impl AppServices {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }
}
