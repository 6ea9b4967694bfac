//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `JWT_SECRET` - token signing secret (min 32 bytes)
//! - `DATABASE_URL` - `PostgreSQL` connection string (unless `STORE_BACKEND=memory`)
//!
//! ## Optional
//! - `STORE_BACKEND` - `postgres` (default) or `memory`
//! - `HOST` / `PORT` - bind address (default `0.0.0.0:8080`)
//! - `JWT_ISSUER` (default `OldSouqsApp`), `JWT_TTL_HOURS` (default 24)
//! - `REQUEST_TIMEOUT_SECS` (default 5), `DB_MAX_CONNECTIONS` (default 10)
//! - `NATS_URL` - publish domain events when set
//! - `LOG_FORMAT` - `json` for JSON logs
//! - `SIRV_CLIENT_ID`, `SIRV_CLIENT_SECRET`, `SIRV_API_URL`, `SIRV_PUBLIC_URL`, `SIRV_FOLDER`

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend { Postgres, Memory }

impl FromStr for StoreBackend {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("expected 'postgres' or 'memory', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub store: StoreBackend,
    /// Required for the postgres backend.
    pub database_url: Option<SecretString>,
    pub db_max_connections: u32,
    pub request_timeout: Duration,
    pub nats_url: Option<String>,
    pub json_logs: bool,
    pub auth: AuthConfig,
    pub images: Option<ImageHostConfig>,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: SecretString,
    pub issuer: String,
    pub token_ttl: chrono::Duration,
}

/// Third-party image host credentials. `Debug` redacts the secret.
#[derive(Debug, Clone)]
pub struct ImageHostConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub api_url: String,
    pub public_url: String,
    pub folder: String,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a required variable is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let store: StoreBackend = get_env_or("STORE_BACKEND", StoreBackend::Postgres)?;
        let database_url = get_optional_env("DATABASE_URL").map(SecretString::from);
        if store == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingEnvVar("DATABASE_URL".to_string()));
        }

        let jwt_secret = get_required_env("JWT_SECRET")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::InvalidEnvVar(
                "JWT_SECRET".to_string(),
                format!("must be at least {MIN_JWT_SECRET_LENGTH} bytes"),
            ));
        }

        let images = match (get_optional_env("SIRV_CLIENT_ID"), get_optional_env("SIRV_CLIENT_SECRET")) {
            (Some(client_id), Some(secret)) => Some(ImageHostConfig {
                client_id,
                client_secret: SecretString::from(secret),
                api_url: get_optional_env("SIRV_API_URL").unwrap_or_else(|| "https://api.sirv.com".to_string()),
                public_url: get_optional_env("SIRV_PUBLIC_URL").unwrap_or_else(|| "https://old-souqs.sirv.com/".to_string()),
                folder: get_optional_env("SIRV_FOLDER").unwrap_or_else(|| "Products".to_string()),
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::InvalidEnvVar(
                    "SIRV_CLIENT_ID".to_string(),
                    "SIRV_CLIENT_ID and SIRV_CLIENT_SECRET must be set together".to_string(),
                ))
            }
        };

        Ok(Self {
            host: get_env_or("HOST", IpAddr::from([0, 0, 0, 0]))?,
            port: get_env_or("PORT", 8080)?,
            store,
            database_url,
            db_max_connections: get_env_or("DB_MAX_CONNECTIONS", 10)?,
            request_timeout: Duration::from_secs(get_env_or("REQUEST_TIMEOUT_SECS", 5)?),
            nats_url: get_optional_env("NATS_URL"),
            json_logs: get_optional_env("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
            auth: AuthConfig {
                jwt_secret: SecretString::from(jwt_secret),
                issuer: get_optional_env("JWT_ISSUER").unwrap_or_else(|| "OldSouqsApp".to_string()),
                token_ttl: chrono::Duration::hours(get_env_or("JWT_TTL_HOURS", 24)?),
            },
            images,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn get_optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    get_optional_env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn get_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_optional_env(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}
