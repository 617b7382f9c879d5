use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use axum::http::HeaderValue;

use crate::error::ConfigError;

pub const DEFAULT_FLAGD_HOST: &str = "localhost";
pub const DEFAULT_FLAGD_PORT: u16 = 8013;
pub const DEFAULT_FLAGD_TIMEOUT_MS: u64 = 500;
pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub flagd_host: String,
    pub flagd_port: u16,
    pub flagd_tls: bool,
    pub flagd_timeout: Duration,
    pub frontend_origin: HeaderValue,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv().is_ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Parses the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_port(get("PORT"), "PORT", DEFAULT_PORT)?;

        let flagd_host = get("FLAGD_HOST").unwrap_or_else(|| DEFAULT_FLAGD_HOST.to_string());
        let flagd_port = parse_port(get("FLAGD_PORT"), "FLAGD_PORT", DEFAULT_FLAGD_PORT)?;
        let flagd_tls = get("FLAGD_TLS").map(|v| is_truthy(&v)).unwrap_or(false);

        let flagd_timeout = match get("FLAGD_TIMEOUT_MS") {
            None => Duration::from_millis(DEFAULT_FLAGD_TIMEOUT_MS),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    return Err(ConfigError::invalid(
                        "FLAGD_TIMEOUT_MS",
                        raw,
                        "must be a positive number of milliseconds",
                    ))
                }
            },
        };

        let origin = get("FRONTEND_ORIGIN").unwrap_or_else(|| DEFAULT_FRONTEND_ORIGIN.to_string());
        let frontend_origin = HeaderValue::from_str(origin.trim()).map_err(|_| {
            ConfigError::invalid("FRONTEND_ORIGIN", origin.clone(), "not a valid header value")
        })?;

        let log_format = match get("LOG_FORMAT").as_deref().map(str::to_ascii_lowercase) {
            Some(f) if f == "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            host,
            port,
            flagd_host,
            flagd_port,
            flagd_tls,
            flagd_timeout,
            frontend_origin,
            log_format,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn flagd_base_url(&self) -> String {
        let scheme = if self.flagd_tls { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.flagd_host, self.flagd_port)
    }
}

fn parse_port(raw: Option<String>, key: &'static str, default: u16) -> Result<u16, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => match value.trim().parse() {
            Ok(port) => Ok(port),
            Err(_) => Err(ConfigError::invalid(key, value, "must be a valid u16 number")),
        },
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
