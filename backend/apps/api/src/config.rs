//! Process Configuration
//!
//! Read once at startup from the environment (a `.env` file is optional).

use std::net::SocketAddr;
use std::time::Duration;

use auth::AuthConfig;
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_TOKEN_MINUTES: u64 = 60;
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            max_connections: parse_or(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            )?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database: DatabaseConfig,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
}

impl ApiConfig {
    /// Release builds refuse to start without `JWT_SECRET`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup, !cfg!(debug_assertions))
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        require_secret: bool,
    ) -> Result<Self, ConfigError> {
        let database = DatabaseConfig::from_lookup(&lookup)?;
        let bind_addr = parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8000)))?;

        let frontend_origins = lookup("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            database,
            bind_addr,
            frontend_origins,
            auth: auth_config(&lookup, require_secret)?,
        })
    }
}

/// Token and password settings for the auth crate
pub fn auth_config(
    lookup: &impl Fn(&str) -> Option<String>,
    require_secret: bool,
) -> Result<AuthConfig, ConfigError> {
    let base = match lookup("JWT_SECRET").filter(|secret| !secret.is_empty()) {
        Some(secret) => AuthConfig {
            token_secret: secret.into_bytes(),
            ..AuthConfig::default()
        },
        None if require_secret => return Err(ConfigError::Missing("JWT_SECRET")),
        None => {
            tracing::warn!("JWT_SECRET not set, using a random secret for this process");
            AuthConfig::with_random_secret()
        }
    };

    let minutes = parse_or(lookup, "JWT_ACCESS_EXPIRES_MINUTES", DEFAULT_TOKEN_MINUTES)?;
    if minutes == 0 {
        return Err(invalid("JWT_ACCESS_EXPIRES_MINUTES", "0"));
    }

    Ok(AuthConfig {
        token_ttl: Duration::from_secs(minutes * 60),
        password_pepper: lookup("PASSWORD_PEPPER")
            .filter(|pepper| !pepper.is_empty())
            .map(String::into_bytes),
        ..base
    })
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| invalid(key, &raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            ApiConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/t")]), false)
                .unwrap();

        assert_eq!(config.database.url, "postgres://localhost/t");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.bind_addr.port(), 8000);
        assert_eq!(
            config.frontend_origins,
            vec!["http://localhost:3000", "http://127.0.0.1:3000"]
        );
        assert_eq!(config.auth.token_ttl_secs(), 3600);
        assert!(config.auth.pepper().is_none());
    }

    #[test]
    fn test_overrides() {
        let config = ApiConfig::from_lookup(
            lookup(&[
                ("DATABASE_URL", "postgres://db/app"),
                ("DATABASE_MAX_CONNECTIONS", "12"),
                ("BIND_ADDR", "127.0.0.1:9000"),
                ("JWT_SECRET", "s3cret"),
                ("JWT_ACCESS_EXPIRES_MINUTES", "15"),
                ("PASSWORD_PEPPER", "pep"),
                ("FRONTEND_ORIGINS", "https://a.example, https://b.example,"),
            ]),
            true,
        )
        .unwrap();

        assert_eq!(config.database.max_connections, 12);
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.auth.token_secret, b"s3cret".to_vec());
        assert_eq!(config.auth.token_ttl_secs(), 15 * 60);
        assert_eq!(config.auth.pepper(), Some(&b"pep"[..]));
        assert_eq!(
            config.frontend_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_missing_values() {
        let err = ApiConfig::from_lookup(lookup(&[]), false).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));

        let err = ApiConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://db")]), true)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn test_invalid_values() {
        let err = ApiConfig::from_lookup(
            lookup(&[("DATABASE_URL", "postgres://db"), ("BIND_ADDR", "nowhere")]),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "BIND_ADDR", .. }));

        let err = ApiConfig::from_lookup(
            lookup(&[
                ("DATABASE_URL", "postgres://db"),
                ("JWT_ACCESS_EXPIRES_MINUTES", "0"),
            ]),
            false,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "JWT_ACCESS_EXPIRES_MINUTES",
                ..
            }
        ));
    }
}
