//! Tracing setup: console output always, plus a Loki push layer when the
//! `loki` feature is built and `LOKI_ENABLED` is set.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

use crate::config::ConfigError;

pub const DEFAULT_SERVICE_NAME: &str = "eagle-backend";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub loki_enabled: bool,
    pub loki_url: Option<Url>,
    pub service_name: String,
    pub environment: String,
    /// `EnvFilter` directive, e.g. `info` or `eagle_backend=debug,sqlx=warn`.
    pub log_level: String,
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let loki_enabled = match non_blank("LOKI_ENABLED") {
            None => false,
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::Invalid {
                name: "LOKI_ENABLED",
                value: raw,
            })?,
        };

        let loki_url = match non_blank("LOKI_URL") {
            None => None,
            Some(raw) => Some(Url::parse(raw.trim()).map_err(|_| ConfigError::Invalid {
                name: "LOKI_URL",
                value: raw,
            })?),
        };

        let config = Self {
            loki_enabled,
            loki_url,
            service_name: non_blank("SERVICE_NAME").unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
            environment: non_blank("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            log_level: non_blank("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.loki_enabled && self.loki_url.is_none() {
            return Err(ConfigError::Missing("LOKI_URL"));
        }
        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Installs the global subscriber. Must run inside the tokio runtime when
/// Loki is enabled, since the push task is spawned onto it.
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    let registry = tracing_subscriber::registry()
        .with(EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer());

    #[cfg(feature = "loki")]
    let registry = registry.with(loki_layer(config)?);

    registry.try_init()?;

    if cfg!(not(feature = "loki")) && config.loki_enabled {
        tracing::warn!("LOKI_ENABLED is set but the binary was built without the `loki` feature");
    }

    info!(
        service = %config.service_name,
        environment = %config.environment,
        filter = %config.log_level,
        "📊 Logging initialized"
    );
    Ok(())
}

#[cfg(feature = "loki")]
fn loki_layer(config: &LoggingConfig) -> Result<Option<tracing_loki::Layer>, tracing_loki::Error> {
    let url = match (&config.loki_url, config.loki_enabled) {
        (Some(url), true) => url.clone(),
        _ => return Ok(None),
    };

    let (layer, task) = tracing_loki::builder()
        .label("service", &config.service_name)?
        .label("environment", &config.environment)?
        .build_url(url)?;
    tokio::spawn(task);

    Ok(Some(layer))
}
