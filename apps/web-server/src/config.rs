//! Application configuration loaded from environment variables.

use std::env;

#[cfg(feature = "postgres")]
use yatube_infra::database::DatabaseConfig;
use yatube_infra::JwtConfig;
#[cfg(feature = "rate-limit")]
use yatube_infra::RateLimitConfig;

use crate::telemetry::TelemetryConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs on the in-memory store.
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    #[cfg(feature = "rate-limit")]
    pub rate_limit: RateLimitConfig,
    pub telemetry: TelemetryConfig,
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 8080),
            #[cfg(feature = "postgres")]
            database: env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
                url,
                max_connections: parse_or("DB_MAX_CONNECTIONS", 100),
                min_connections: parse_or("DB_MIN_CONNECTIONS", 10),
                auto_migrate: env::var("DB_AUTO_MIGRATE")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(false),
            }),
            jwt: JwtConfig::from_env(),
            #[cfg(feature = "rate-limit")]
            rate_limit: RateLimitConfig::from_env(),
            telemetry: TelemetryConfig::from_env(),
        }
    }
}
