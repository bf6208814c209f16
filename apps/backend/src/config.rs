//! Server configuration from environment variables

use std::time::Duration;

use thiserror::Error;

use crate::services::RetryPolicy;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Backend configuration
///
/// Read from the process environment (and `.env` when present):
/// - DATABASE_URL: SQLite URL (default `sqlite://lexis.db`)
/// - HOST / PORT: listen address (default `0.0.0.0:3000`)
/// - RETRY_MAX_ATTEMPTS: attempts per persistence call (default 3)
/// - RETRY_BASE_DELAY_MS / RETRY_MAX_DELAY_MS: backoff bounds (default 1000 / 10000)
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub retry: RetryPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = RetryPolicy::default();
        let number = |name: &'static str, default: u64| -> Result<u64, ConfigError> {
            match lookup(name) {
                None => Ok(default),
                Some(value) => match value.trim().parse::<u64>() {
                    Ok(n) if n > 0 => Ok(n),
                    _ => Err(ConfigError::InvalidNumber { name, value }),
                },
            }
        };

        let port = number("PORT", 3000)?;
        let port = u16::try_from(port).map_err(|_| ConfigError::InvalidNumber {
            name: "PORT",
            value: port.to_string(),
        })?;
        let max_attempts = number("RETRY_MAX_ATTEMPTS", defaults.max_attempts as u64)?;

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://lexis.db".to_string()),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            retry: RetryPolicy {
                max_attempts: u32::try_from(max_attempts).unwrap_or(u32::MAX),
                base_delay: Duration::from_millis(number(
                    "RETRY_BASE_DELAY_MS",
                    defaults.base_delay.as_millis() as u64,
                )?),
                max_delay: Duration::from_millis(number(
                    "RETRY_MAX_DELAY_MS",
                    defaults.max_delay.as_millis() as u64,
                )?),
            },
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
