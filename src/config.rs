use std::net::SocketAddr;
use std::time::Duration;

use crate::services::price_service::PriceLookupOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub store_backend: StoreBackend,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub price_feed_url: Option<String>,
    pub price_feed_timeout_ms: u64,
    pub price_feed_concurrency: usize,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> Self {
        let store_backend = match std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => StoreBackend::Memory,
            _ => StoreBackend::Postgres,
        };

        Self {
            database_url: std::env::var("DATABASE_URL").ok(),
            store_backend,
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            price_feed_url: std::env::var("PRICE_FEED_URL").ok(),
            price_feed_timeout_ms: env_or("PRICE_FEED_TIMEOUT_MS", 3000),
            price_feed_concurrency: env_or("PRICE_FEED_CONCURRENCY", 8),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.store_backend == StoreBackend::Postgres && self.database_url.is_none() {
            return Err("STORE_BACKEND is postgres but DATABASE_URL is not set".to_string());
        }
        if self.price_feed_timeout_ms == 0 {
            return Err("PRICE_FEED_TIMEOUT_MS must be greater than zero".to_string());
        }
        if self.price_feed_concurrency == 0 {
            return Err("PRICE_FEED_CONCURRENCY must be greater than zero".to_string());
        }
        self.bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| format!("BIND_ADDR '{}' is invalid: {}", self.bind_addr, e))?;
        Ok(())
    }

    pub fn price_lookup_options(&self) -> PriceLookupOptions {
        PriceLookupOptions {
            timeout: Duration::from_millis(self.price_feed_timeout_ms),
            concurrency: self.price_feed_concurrency,
        }
    }
}
