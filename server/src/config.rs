//! Server configuration from environment variables.

use std::env;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;
use thiserror::Error;
use url::Url;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 3000));

/// Default maximum number of pooled database connections.
pub const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Default PostgreSQL port when assembling a URL from parts.
pub const DEFAULT_POSTGRES_PORT: u16 = 5432;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: String, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub pool_max_size: u32,
    pub run_migrations: bool,
    pub track_query_count: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Database:
    /// - `DATABASE_URL`, or all of `POSTGRES_HOST`, `POSTGRES_DB`, `POSTGRES_USER`
    ///   with optional `POSTGRES_PORT` (default 5432) and `POSTGRES_PASSWORD`
    ///
    /// Optional:
    /// - `BIND_ADDR`: listen address (default: "0.0.0.0:3000")
    /// - `DB_POOL_MAX_SIZE`: pool size (default: 10)
    /// - `RUN_MIGRATIONS`: apply pending migrations on startup (default: true)
    /// - `TRACK_DB_QUERY_COUNT`: add X-DB-Query-Count to responses (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => postgres_url(&lookup)?,
        };

        Ok(Self {
            database_url,
            bind_addr: parse_or(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR)?,
            pool_max_size: parse_or(&lookup, "DB_POOL_MAX_SIZE", DEFAULT_POOL_MAX_SIZE)?,
            run_migrations: flag(&lookup, "RUN_MIGRATIONS", true)?,
            track_query_count: flag(&lookup, "TRACK_DB_QUERY_COUNT", false)?,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn postgres_url<F>(lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let host = required(lookup, "POSTGRES_HOST")?;
    let database = required(lookup, "POSTGRES_DB")?;
    let user = required(lookup, "POSTGRES_USER")?;
    let port: u16 = parse_or(lookup, "POSTGRES_PORT", DEFAULT_POSTGRES_PORT)?;

    let invalid = |key: &str, value: &str| ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    };

    let mut url = Url::parse(&format!("postgres://{host}:{port}"))
        .map_err(|_| invalid("POSTGRES_HOST", &host))?;
    url.path_segments_mut()
        .map_err(|_| invalid("POSTGRES_HOST", &host))?
        .push(&database);

    // Userinfo is percent-encoded by the setters.
    url.set_username(&user)
        .map_err(|_| invalid("POSTGRES_USER", &user))?;
    if let Some(password) = lookup("POSTGRES_PASSWORD") {
        url.set_password(Some(&password))
            .map_err(|_| invalid("POSTGRES_PASSWORD", "<redacted>"))?;
    }

    Ok(url.into())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

fn flag<F>(lookup: &F, key: &str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "TRUE" | "yes") => Ok(true),
        Some("0" | "false" | "FALSE" | "no") => Ok(false),
        Some(other) => Err(ConfigError::Invalid {
            key: key.to_string(),
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_database_url_with_defaults() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/recipes")]).unwrap();
        assert_eq!(config.database_url, "postgres://localhost/recipes");
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.pool_max_size, DEFAULT_POOL_MAX_SIZE);
        assert!(config.run_migrations);
        assert!(!config.track_query_count);
    }

    #[test]
    fn test_url_assembled_from_parts() {
        let config = load(&[
            ("POSTGRES_HOST", "db"),
            ("POSTGRES_DB", "recipes"),
            ("POSTGRES_USER", "chef"),
            ("POSTGRES_PASSWORD", "secret"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "postgres://chef:secret@db:5432/recipes");
    }

    #[test]
    fn test_url_parts_are_percent_encoded() {
        let config = load(&[
            ("POSTGRES_HOST", "db"),
            ("POSTGRES_PORT", "6543"),
            ("POSTGRES_DB", "recipes"),
            ("POSTGRES_USER", "chef"),
            ("POSTGRES_PASSWORD", "p@ss/w#rd:1"),
        ])
        .unwrap();
        assert_eq!(
            config.database_url,
            "postgres://chef:p%40ss%2Fw%23rd%3A1@db:6543/recipes"
        );

        let parsed = Url::parse(&config.database_url).unwrap();
        assert_eq!(parsed.host_str(), Some("db"));
        assert_eq!(parsed.path(), "/recipes");
    }

    #[test]
    fn test_missing_database_settings() {
        let err = load(&[("POSTGRES_HOST", "db")]).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnvVar("POSTGRES_DB".to_string()));
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("DATABASE_URL", "postgres://x"), ("DB_POOL_MAX_SIZE", "lots")])
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "DB_POOL_MAX_SIZE".to_string(),
                value: "lots".to_string(),
            }
        );

        let err = load(&[("DATABASE_URL", "postgres://x"), ("RUN_MIGRATIONS", "maybe")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_flags() {
        let config = load(&[
            ("DATABASE_URL", "postgres://x"),
            ("RUN_MIGRATIONS", "0"),
            ("TRACK_DB_QUERY_COUNT", "1"),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ])
        .unwrap();
        assert!(!config.run_migrations);
        assert!(config.track_query_count);
        assert_eq!(config.bind_addr.port(), 8080);
    }
}
