//! Server configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration as StdDuration;

use chrono::Duration;
use thiserror::Error;

use kanelm_auth::SessionConfig;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub permissions_path: PathBuf,
    /// Postgres URL for ownership checks; `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub session: SessionConfig,
    pub query_timeout: Option<StdDuration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            permissions_path: PathBuf::from("permissions.toml"),
            database_url: None,
            db_max_connections: 8,
            session: SessionConfig::default(),
            query_timeout: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the config from an arbitrary variable source (env, tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("KANELM_BIND_ADDR") {
            config.bind_addr = parse("KANELM_BIND_ADDR", &v)?;
        }
        if let Some(v) = get("KANELM_PERMISSIONS") {
            config.permissions_path = PathBuf::from(v);
        }
        config.database_url = get("DATABASE_URL");
        if let Some(v) = get("KANELM_DB_MAX_CONNECTIONS") {
            config.db_max_connections = positive("KANELM_DB_MAX_CONNECTIONS", &v)? as u32;
        }
        if let Some(v) = get("KANELM_SESSION_TTL_SECS") {
            let secs = positive("KANELM_SESSION_TTL_SECS", &v)?;
            config.session.ttl = Duration::seconds(secs as i64);
        }
        if let Some(v) = get("KANELM_SESSION_SWEEP_SECS") {
            let secs = positive("KANELM_SESSION_SWEEP_SECS", &v)?;
            config.session.sweep_interval = StdDuration::from_secs(secs);
        }
        if let Some(v) = get("KANELM_QUERY_TIMEOUT_MS") {
            let ms = positive("KANELM_QUERY_TIMEOUT_MS", &v)?;
            config.query_timeout = Some(StdDuration::from_millis(ms));
        }

        Ok(config)
    }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, AppConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| AppConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

// Upper bound keeps every value representable as u32 / i64 seconds.
fn positive(var: &'static str, value: &str) -> Result<u64, AppConfigError> {
    let n: u64 = parse(var, value)?;
    if n == 0 || n > u32::MAX as u64 {
        return Err(AppConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: format!("must be between 1 and {}", u32::MAX),
        });
    }
    Ok(n)
}
