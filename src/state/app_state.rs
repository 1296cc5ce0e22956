use mongodb::Database;

use crate::config::app_config::AppConfig;
use crate::utils::validation_cache::ValidationCache;

pub struct AppState {
    pub db: Database,
    pub config: AppConfig,
    pub http: reqwest::Client,
    pub validation_cache: ValidationCache,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        let validation_cache = ValidationCache::new(
            config.cache_capacity,
            std::time::Duration::from_secs(config.cache_ttl_secs),
        );

        Self {
            db,
            config,
            http: reqwest::Client::new(),
            validation_cache,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State over a lazily connecting client. Nothing talks to MongoDB until
    /// a query runs.
    pub async fn for_tests() -> Self {
        let config = AppConfig::for_tests();
        let client = mongodb::Client::with_uri_str(&config.mongodb_uri)
            .await
            .expect("test MongoDB URI should parse");
        let db = client.database(&config.database_name);
        Self::new(db, config)
    }
}
