//! Server configuration read from the environment (and `.env`, loaded in `main`).

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub http_host: String,
    pub http_port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5)?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            token_ttl_hours: parse_or("TOKEN_TTL_HOURS", 24)?,
            http_host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: parse_or("HTTP_PORT", 3000)?,
        })
    }

    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 6] = [
        "DATABASE_URL",
        "DATABASE_MAX_CONNECTIONS",
        "JWT_SECRET",
        "TOKEN_TTL_HOURS",
        "HTTP_HOST",
        "HTTP_PORT",
    ];

    fn clear() {
        for key in KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn defaults_apply_when_optional_values_missing() {
        clear();
        env::set_var("DATABASE_URL", "postgres://localhost/blogicum");
        env::set_var("JWT_SECRET", "secret");

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.token_ttl_hours, 24);
        assert_eq!(config.http_addr(), "0.0.0.0:3000");
        clear();
    }

    #[test]
    #[serial]
    fn missing_database_url_is_reported() {
        clear();
        env::set_var("JWT_SECRET", "secret");

        let err = ServerConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
        clear();
    }

    #[test]
    #[serial]
    fn invalid_port_is_rejected() {
        clear();
        env::set_var("DATABASE_URL", "postgres://localhost/blogicum");
        env::set_var("JWT_SECRET", "secret");
        env::set_var("HTTP_PORT", "eighty");

        let err = ServerConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("HTTP_PORT"));
        clear();
    }
}
