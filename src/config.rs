//! Runtime configuration read from the environment (and `.env` via dotenvy).

use std::env;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Reads:
/// - `DATABASE_URL` (required)
/// - `HOST` (default `0.0.0.0`) and `PORT` (default `8080`)
/// - `API_PREFIX` (default `/api/v1`)
/// - `NOTIFY_TIMEOUT_SECS` (default `5`)
/// - `SHOP_NAME` (default `Twinkle`)
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub api_prefix: String,
    pub notify_timeout: Duration,
    pub shop_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = get("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            None => 8080,
        };

        let notify_timeout = match get("NOTIFY_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "NOTIFY_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            },
            None => Duration::from_secs(5),
        };

        let api_prefix = get("API_PREFIX").unwrap_or_else(|| "/api/v1".to_string());
        let api_prefix = format!("/{}", api_prefix.trim().trim_matches('/'));

        Ok(Self {
            database_url,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            api_prefix,
            notify_timeout,
            shop_name: get("SHOP_NAME").unwrap_or_else(|| "Twinkle".to_string()),
        })
    }
}
