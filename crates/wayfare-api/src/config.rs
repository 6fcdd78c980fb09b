//! Server configuration read from the environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use tracing::warn;

use wayfare_db::PoolConfig;
use wayfare_search::flags::parse_bool_env;
use wayfare_search::SearchConfig;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/wayfare";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    /// Start without touching the database; every data endpoint answers 503.
    pub skip_db: bool,
    pub run_migrations: bool,
    pub host: String,
    pub port: u16,
    pub pool: PoolConfig,
    pub allowed_origins: Vec<HeaderValue>,
    pub search: SearchConfig,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = PoolConfig::default();
        let pool = PoolConfig {
            max_connections: parse_env("DB_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: parse_env("DB_MIN_CONNECTIONS", defaults.min_connections),
            connect_timeout: Duration::from_secs(parse_env(
                "DB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout.as_secs(),
            )),
            idle_timeout: Duration::from_secs(parse_env(
                "DB_IDLE_TIMEOUT_SECS",
                defaults.idle_timeout.as_secs(),
            )),
            // 0 disables connection recycling.
            max_lifetime: PoolConfig::lifetime_from_secs(parse_env(
                "DB_MAX_LIFETIME_SECS",
                defaults.max_lifetime.map_or(0, |d| d.as_secs()),
            )),
        };

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            skip_db: parse_bool_env("SKIP_DB", false),
            run_migrations: parse_bool_env("RUN_MIGRATIONS", true),
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: parse_env("PORT", DEFAULT_PORT),
            pool,
            allowed_origins: parse_allowed_origins(
                &env::var("ALLOWED_ORIGINS").unwrap_or_default(),
            ),
            search: SearchConfig::from_env(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a numeric variable, keeping the default on absence or garbage.
fn parse_env<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                warn!(key, value = %raw, default = %default, "Ignoring invalid numeric setting");
                default
            }
        },
        Err(_) => default,
    }
}

/// Comma-separated CORS origins. Blank input yields the development defaults.
pub fn parse_allowed_origins(raw: &str) -> Vec<HeaderValue> {
    let raw = if raw.trim().is_empty() {
        DEFAULT_ALLOWED_ORIGINS
    } else {
        raw
    };

    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}
