//! Process configuration from environment variables.

/// Runtime configuration for the API binary.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// `DATABASE_URL` wins; otherwise the URL is assembled from the discrete
    /// `DB_HOST`/`DB_USER`/`DB_PASSWORD`/`DB_DATABASE`/`DB_PORT` variables.
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            let host = env_or("DB_HOST", "localhost");
            let user = env_or("DB_USER", "stockroom");
            let password = env_or("DB_PASSWORD", "stockroom");
            let database = env_or("DB_DATABASE", "stockroom");
            let db_port = env_or("DB_PORT", "5432");
            format!("postgres://{user}:{password}@{host}:{db_port}/{database}")
        });

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        Self {
            port,
            database_url,
            jwt_secret,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
