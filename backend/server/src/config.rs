use std::{env, fmt, fs::read_to_string, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load(&lookup, "RUST_PORT", "1111")?,
            database_url: try_load(&lookup, "DATABASE_URL", "sqlite://food.db")?,
            max_connections: try_load(&lookup, "DATABASE_MAX_CONNECTIONS", "5")?,
            jwt: JwtConfig {
                secret: require(&lookup, "JWT_SECRET")?,
                issuer: require(&lookup, "JWT_ISSUER")?,
                audience: require(&lookup, "JWT_AUDIENCE")?,
            },
        })
    }
}

/// Mounted secrets win over environment variables.
fn lookup(key: &str) -> Option<String> {
    read_secret(key).or_else(|| var(key))
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path).ok().map(|s| s.trim().to_string())
}

fn try_load<T: FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key,
                reason: e.to_string(),
            }
        })
}

fn require(
    lookup: impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<String, ConfigError> {
    lookup(key).filter(|value| !value.is_empty()).ok_or_else(|| {
        warn!("{key} not found");
        ConfigError::Missing(key)
    })
}
