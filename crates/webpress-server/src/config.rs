//! Environment-driven configuration.
//!
//! The recognized variables are `MONGO_URL`, `DB_NAME`, `CORS_ORIGINS`
//! (optional comma-separated allow-list) and `BIND_ADDR` (optional).
//! There is no other runtime configuration surface.

use std::env;
use std::net::SocketAddr;

use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    /// `BIND_ADDR` is not a valid socket address.
    #[error("invalid bind address: {0}")]
    InvalidBindAddr(String),
}

/// Runtime configuration resolved at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// MongoDB connection string.
    pub mongo_url: String,
    /// Database name to open on the connected client.
    pub db_name: String,
    /// CORS origin allow-list. Empty means every origin is allowed.
    pub cors_origins: Vec<String>,
    /// Address the HTTP listener binds to.
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `MONGO_URL` or `DB_NAME` is absent, or if
    /// `BIND_ADDR` is set but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mongo_url =
            env::var("MONGO_URL").map_err(|_| ConfigError::MissingVar("MONGO_URL"))?;
        let db_name = env::var("DB_NAME").map_err(|_| ConfigError::MissingVar("DB_NAME"))?;

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_default();

        let raw_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(raw_addr))?;

        Ok(Self {
            mongo_url,
            db_name,
            cors_origins,
            bind_addr,
        })
    }
}

/// Parse a comma-separated origin list. A `*` entry (or an effectively
/// empty list) yields an empty vec, meaning allow any origin.
fn parse_origins(raw: &str) -> Vec<String> {
    let entries: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if entries.is_empty() || entries.contains(&"*") {
        return Vec::new();
    }
    entries.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_list() {
        let origins = parse_origins("https://a.example, https://b.example");
        assert_eq!(origins, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_parse_origins_wildcard() {
        assert!(parse_origins("*").is_empty());
        assert!(parse_origins("https://a.example,*").is_empty());
    }

    #[test]
    fn test_parse_origins_empty() {
        assert!(parse_origins("").is_empty());
        assert!(parse_origins(" , ,").is_empty());
    }

    #[test]
    fn test_default_bind_addr_parses() {
        let addr: SocketAddr = DEFAULT_BIND_ADDR.parse().unwrap();
        assert_eq!(addr.port(), 8000);
    }
}
