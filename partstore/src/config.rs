//! Server configuration from the environment (and a `.env` file, if present)

use std::fmt;
use std::net::SocketAddr;

use crate::vehicle::VehicleModel;

pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidBindAddress(String),
    InvalidDefaultModel(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBindAddress(raw) => write!(f, "PARTSTORE_BIND is not a socket address: '{raw}'"),
            Self::InvalidDefaultModel(raw) => write!(f, "PARTSTORE_DEFAULT_MODEL is not a vehicle model: '{raw}'"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    /// `DATABASE_URL`
    pub database_url: String,
    /// `PARTSTORE_BIND`
    pub bind: SocketAddr,
    /// `PARTSTORE_LOG`, an `EnvFilter` directive
    pub log_filter: String,
    /// `PARTSTORE_DEFAULT_MODEL`
    pub default_model: VehicleModel,
}

impl Config {
    /// Load `.env` if there is one, then read the environment
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for a bind address or vehicle model that does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is the normal case outside development
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for a bind address or vehicle model that does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = get("PARTSTORE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(bind_raw.clone()))?;

        let default_model = match get("PARTSTORE_DEFAULT_MODEL") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidDefaultModel(raw))?,
            None => VehicleModel::ModelY,
        };

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind,
            log_filter: get("PARTSTORE_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            default_model,
        })
    }
}
