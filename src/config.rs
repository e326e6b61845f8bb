// Configuration for the query cache:
// - Cache settings (size, TTL)
// - Log filter

use dotenv::dotenv;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub cache_ttl: Duration,
    pub cache_max_capacity: u64,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            cache_max_capacity: 1000,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let defaults = Self::default();

        let cache_ttl = env::var("CACHE_TTL")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);
        let cache_max_capacity = env::var("CACHE_MAX_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.cache_max_capacity);
        let log_filter = env::var("RUST_LOG").unwrap_or(defaults.log_filter);

        Self {
            cache_ttl,
            cache_max_capacity,
            log_filter,
        }
    }
}
