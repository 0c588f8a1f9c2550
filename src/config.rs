use std::env;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::auth::filter::DEFAULT_AUTH_COOKIE;
use crate::auth::token::DEFAULT_TOKEN_TTL_SECS;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} must be a number, got `{value}`")]
    NotANumber { key: &'static str, value: String },
    #[error("{key} must not be negative, got {value}")]
    Negative { key: &'static str, value: i64 },
}

#[derive(Clone)]
pub struct Config {
    /// Postgres connection string. `None` runs on the in-memory stores.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    /// HMAC key for tokens. Read once at startup, never changed afterwards.
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    /// Clock-skew tolerance when checking token expiry.
    pub token_leeway_secs: i64,
    pub auth_cookie_name: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("server_port", &self.server_port)
            .field("server_host", &self.server_host)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("token_leeway_secs", &self.token_leeway_secs)
            .field("auth_cookie_name", &self.auth_cookie_name)
            .finish()
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::NotANumber { key, value }),
        None => Ok(default),
    }
}

fn non_negative(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: i64,
) -> Result<i64, ConfigError> {
    let value = parse_or(lookup, key, default)?;
    if value < 0 {
        return Err(ConfigError::Negative { key, value });
    }
    Ok(value)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|s| !s.is_empty()),
            server_port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret,
            token_ttl_secs: non_negative(&lookup, "TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)?,
            token_leeway_secs: non_negative(&lookup, "TOKEN_LEEWAY_SECS", 0)?,
            auth_cookie_name: lookup("AUTH_COOKIE_NAME")
                .unwrap_or_else(|| DEFAULT_AUTH_COOKIE.to_string()),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| vars.get(key).map(|v| v.to_string())
    }

    #[test]
    fn test_config_defaults() {
        let vars = HashMap::from([("JWT_SECRET", "wellwellwell")]);
        let config = Config::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.database_url, None);
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.token_ttl_secs, 3600);
        assert_eq!(config.token_leeway_secs, 0);
        assert_eq!(config.auth_cookie_name, "auth_token");
        assert_eq!(config.server_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_config_custom_values() {
        let vars = HashMap::from([
            ("JWT_SECRET", "wellwellwell"),
            ("DATABASE_URL", "postgres://test"),
            ("SERVER_PORT", "3000"),
            ("SERVER_HOST", "0.0.0.0"),
            ("TOKEN_TTL_SECS", "900"),
            ("TOKEN_LEEWAY_SECS", "5"),
            ("AUTH_COOKIE_NAME", "session"),
        ]);
        let config = Config::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.database_url.as_deref(), Some("postgres://test"));
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.token_ttl_secs, 900);
        assert_eq!(config.token_leeway_secs, 5);
        assert_eq!(config.auth_cookie_name, "session");
    }

    #[test]
    fn test_config_errors() {
        let vars = HashMap::new();
        assert_eq!(
            Config::from_lookup(lookup(&vars)).unwrap_err(),
            ConfigError::Missing("JWT_SECRET")
        );

        let vars = HashMap::from([("JWT_SECRET", "s"), ("SERVER_PORT", "eighty")]);
        assert!(matches!(
            Config::from_lookup(lookup(&vars)),
            Err(ConfigError::NotANumber { key: "SERVER_PORT", .. })
        ));
    }

    #[test]
    fn test_negative_durations_rejected() {
        let vars = HashMap::from([("JWT_SECRET", "s"), ("TOKEN_TTL_SECS", "-60")]);
        assert_eq!(
            Config::from_lookup(lookup(&vars)).unwrap_err(),
            ConfigError::Negative {
                key: "TOKEN_TTL_SECS",
                value: -60
            }
        );

        let vars = HashMap::from([("JWT_SECRET", "s"), ("TOKEN_LEEWAY_SECS", "-1")]);
        assert!(matches!(
            Config::from_lookup(lookup(&vars)),
            Err(ConfigError::Negative { key: "TOKEN_LEEWAY_SECS", .. })
        ));

        let vars = HashMap::from([("JWT_SECRET", "s"), ("TOKEN_TTL_SECS", "0")]);
        assert_eq!(Config::from_lookup(lookup(&vars)).unwrap().token_ttl_secs, 0);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let vars = HashMap::from([("JWT_SECRET", "wellwellwell")]);
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert!(!format!("{:?}", config).contains("wellwellwell"));
    }
}
