//! Runtime settings, read from the environment.

use std::env;
use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;
use thiserror::Error;

pub const ACTOR_BUFFER: &str = "STOREFRONT_ACTOR_BUFFER";
pub const CONFLICT_RETRIES: &str = "STOREFRONT_CONFLICT_RETRIES";
pub const JWT_SECRET: &str = "STOREFRONT_JWT_SECRET";
pub const TOKEN_TTL_SECS: &str = "STOREFRONT_TOKEN_TTL_SECS";
pub const LOG_FILTER: &str = "STOREFRONT_LOG";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Helper to load an environment variable with a default value
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Helper to load an environment variable or return error
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[derive(Clone, PartialEq)]
pub struct SystemConfig {
    /// Mailbox size of every resource actor.
    pub actor_buffer: usize,
    /// How often a quantity change is retried after a concurrent edit.
    pub conflict_retries: u32,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl fmt::Debug for SystemConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemConfig")
            .field("actor_buffer", &self.actor_buffer)
            .field("conflict_retries", &self.conflict_retries)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("log_filter", &self.log_filter)
            .finish()
    }
}

impl SystemConfig {
    /// Defaults for everything except the signing secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            actor_buffer: 32,
            conflict_retries: 3,
            jwt_secret: jwt_secret.into(),
            token_ttl_secs: 2 * 60 * 60,
            log_filter: "info".to_string(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::new(env_required(JWT_SECRET)?);

        let actor_buffer = env_parse(ACTOR_BUFFER, defaults.actor_buffer)?;
        if actor_buffer == 0 {
            return Err(ConfigError::ParseError {
                key: ACTOR_BUFFER.to_string(),
                details: "must be at least 1".to_string(),
            });
        }

        let token_ttl_secs = env_parse(TOKEN_TTL_SECS, defaults.token_ttl_secs)?;
        if token_ttl_secs <= 0 {
            return Err(ConfigError::ParseError {
                key: TOKEN_TTL_SECS.to_string(),
                details: "must be positive".to_string(),
            });
        }

        Ok(Self {
            actor_buffer,
            conflict_retries: env_parse(CONFLICT_RETRIES, defaults.conflict_retries)?,
            token_ttl_secs,
            log_filter: env_or_default(LOG_FILTER, &defaults.log_filter),
            jwt_secret: defaults.jwt_secret,
        })
    }

    pub fn token_ttl(&self) -> TimeDelta {
        TimeDelta::seconds(self.token_ttl_secs)
    }
}
