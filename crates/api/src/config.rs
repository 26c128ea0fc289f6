//! Process configuration, read once at startup.

use std::net::{IpAddr, SocketAddr};

use chrono::Duration;
use thiserror::Error;

use penstack_observability::LogFormat;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8888";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// HS256 signing secret for session tokens. Never empty.
    pub jwt_secret: String,
    pub token_ttl: Duration,
    /// Browser origin allowed to call the API with credentials.
    pub cors_origin: String,
    pub log_format: LogFormat,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("cors_origin", &self.cors_origin)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl AppConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable source.
    ///
    /// - `JWT_SECRET` (required, non-empty)
    /// - `HOST` (default `0.0.0.0`), `PORT` (default `3000`)
    /// - `TOKEN_TTL_SECS` (default `3600`, must be positive)
    /// - `CORS_ORIGIN` (default `http://localhost:8888`)
    /// - `LOG_FORMAT` (`json` or `pretty`, default `json`)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let host: IpAddr = match lookup("HOST") {
            Some(v) => v.parse::<IpAddr>().map_err(|e| ConfigError::Invalid {
                name: "HOST",
                reason: e.to_string(),
            })?,
            None => IpAddr::from([0, 0, 0, 0]),
        };

        let port: u16 = match lookup("PORT") {
            Some(v) => v.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let ttl_secs: i64 = match lookup("TOKEN_TTL_SECS") {
            Some(v) => v.parse::<i64>().map_err(|e| ConfigError::Invalid {
                name: "TOKEN_TTL_SECS",
                reason: e.to_string(),
            })?,
            None => DEFAULT_TOKEN_TTL_SECS,
        };
        if ttl_secs <= 0 {
            return Err(ConfigError::Invalid {
                name: "TOKEN_TTL_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }

        let log_format = match lookup("LOG_FORMAT") {
            Some(v) => v
                .parse::<LogFormat>()
                .map_err(|reason| ConfigError::Invalid { name: "LOG_FORMAT", reason })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            jwt_secret,
            token_ttl: Duration::seconds(ttl_secs),
            cors_origin: lookup("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            log_format,
        })
    }
}
