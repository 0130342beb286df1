use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::external::finnhub::DEFAULT_BASE_URL;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_PRICE_REFRESH_CRON: &str = "0 0 * * * *";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub finnhub_api_key: String,
    pub finnhub_base_url: String,
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    /// Code accepted by `/api/auth`. When unset every attempt is rejected.
    pub auth_code: Option<String>,
    /// Cron expression (with seconds) for the price refresh job. `None` disables it.
    pub price_refresh_cron: Option<String>,
    pub quote_requests_per_minute: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let cors_raw = lookup("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());
        let cors_origin = HeaderValue::from_str(&cors_raw).map_err(|_| ConfigError::Invalid {
            name: "CORS_ORIGIN",
            value: cors_raw.clone(),
        })?;

        let price_refresh_cron = match lookup("PRICE_REFRESH_CRON") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v),
            None => Some(DEFAULT_PRICE_REFRESH_CRON.to_string()),
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            db_max_connections: parse_number(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            finnhub_api_key: required("FINNHUB_API_KEY")?,
            finnhub_base_url: lookup("FINNHUB_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            bind_addr,
            cors_origin,
            auth_code: lookup("AUTH_CODE").filter(|v| !v.is_empty()),
            price_refresh_cron,
            quote_requests_per_minute: parse_number(&lookup, "QUOTE_REQUESTS_PER_MINUTE", 60)?,
        })
    }
}

fn parse_number<F>(lookup: &F, name: &'static str, default: u32) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(v) if v > 0 => Ok(v),
            _ => Err(ConfigError::Invalid { name, value: raw }),
        },
    }
}
