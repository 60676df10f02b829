use std::sync::Arc;

use stockroom_api::app::services::AppServices;
use stockroom_api::config::Config;
use stockroom_auth::TokenService;
use stockroom_infra::{db, PostgresStore};

#[tokio::main]
async fn main() {
    stockroom_observability::init();

    let config = Config::from_env();

    let pool = db::connect(&config.database_url)
        .await
        .expect("failed to connect to database");
    db::migrate(&pool).await.expect("failed to run migrations");

    let store = Arc::new(PostgresStore::new(pool));
    let services = Arc::new(AppServices::new(
        store,
        TokenService::new(config.jwt_secret.as_bytes()),
    ));

    let app = stockroom_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .expect("failed to bind server port");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
