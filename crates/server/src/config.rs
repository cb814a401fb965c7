// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Process configuration.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use nyushi_persistence::{PoolSettings, postgres_url};
use thiserror::Error;

/// Errors raised while resolving the configuration at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable required by the `PostgreSQL` backend is unset or empty.
    #[error("missing required configuration: {0} must be set when SQLITE_PATH is not")]
    MissingVariable(&'static str),
    /// A duration option was configured as zero.
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Nyushi Server - HTTP back-end of the university admissions catalog
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Port to bind the server to
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Address to bind the server to
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: IpAddr,

    /// `PostgreSQL` host
    #[arg(long, env = "DB_HOST")]
    pub db_host: Option<String>,

    /// `PostgreSQL` port
    #[arg(long, env = "DB_PORT", default_value_t = 5432)]
    pub db_port: u16,

    /// `PostgreSQL` user
    #[arg(long, env = "DB_USER")]
    pub db_user: Option<String>,

    /// `PostgreSQL` password
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// `PostgreSQL` database name
    #[arg(long, env = "DB_NAME")]
    pub db_name: Option<String>,

    /// Path to a `SQLite` database file. Selects the development backend.
    #[arg(long, env = "SQLITE_PATH")]
    pub sqlite_path: Option<PathBuf>,

    /// Upper bound on open database connections
    #[arg(long, env = "DB_MAX_OPEN_CONNS", default_value_t = 100)]
    pub db_max_open_conns: u32,

    /// Database connections kept open while idle
    #[arg(long, env = "DB_MAX_IDLE_CONNS", default_value_t = 10)]
    pub db_max_idle_conns: u32,

    /// Seconds after which a database connection is recycled; 0 keeps it
    #[arg(long, env = "DB_CONN_MAX_LIFETIME_SECS", default_value_t = 3600)]
    pub db_conn_max_lifetime_secs: u64,

    /// Per-request deadline in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 5000)]
    pub request_timeout_ms: u64,

    /// Deadline of search requests in milliseconds [default: request timeout]
    #[arg(long, env = "SEARCH_TIMEOUT_MS")]
    pub search_timeout_ms: Option<u64>,

    /// Deadline of batch subject replaces in milliseconds [default: request timeout]
    #[arg(long, env = "BATCH_TIMEOUT_MS")]
    pub batch_timeout_ms: Option<u64>,

    /// Lifetime of cached reads in seconds
    #[arg(long, env = "CACHE_TTL_SECS", default_value_t = 300)]
    pub cache_ttl_secs: u64,

    /// Interval of the cache sweeper in seconds
    #[arg(long, env = "CACHE_SWEEP_INTERVAL_SECS", default_value_t = 600)]
    pub cache_sweep_interval_secs: u64,
}

/// The database the server talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Sqlite(PathBuf),
    Postgres {
        url: String,
        /// `host:port/name`, safe to log.
        display: String,
    },
}

/// Deadlines applied per endpoint class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request: Duration,
    pub search: Duration,
    pub batch: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        let request: Duration = Duration::from_millis(5000);
        Self {
            request,
            search: request,
            batch: request,
        }
    }
}

fn required(value: Option<&String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .ok_or(ConfigError::MissingVariable(name))
}

fn non_zero(value: u64, name: &'static str) -> Result<u64, ConfigError> {
    if value == 0 {
        Err(ConfigError::ZeroDuration(name))
    } else {
        Ok(value)
    }
}

impl Args {
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    /// Selects the backend: `SQLite` when a path is configured, otherwise
    /// `PostgreSQL` built from the `DB_*` variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVariable`] naming the first unset
    /// `PostgreSQL` variable.
    pub fn backend(&self) -> Result<BackendConfig, ConfigError> {
        if let Some(path) = &self.sqlite_path {
            return Ok(BackendConfig::Sqlite(path.clone()));
        }
        let host: String = required(self.db_host.as_ref(), "DB_HOST")?;
        let user: String = required(self.db_user.as_ref(), "DB_USER")?;
        let password: String = required(self.db_password.as_ref(), "DB_PASSWORD")?;
        let name: String = required(self.db_name.as_ref(), "DB_NAME")?;
        Ok(BackendConfig::Postgres {
            url: postgres_url(&host, self.db_port, &user, &password, &name),
            display: format!("{host}:{}/{name}", self.db_port),
        })
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_open: self.db_max_open_conns.max(1),
            max_idle: self.db_max_idle_conns.min(self.db_max_open_conns.max(1)),
            max_lifetime: (self.db_conn_max_lifetime_secs > 0)
                .then(|| Duration::from_secs(self.db_conn_max_lifetime_secs)),
            ..PoolSettings::default()
        }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroDuration`] for a zero timeout.
    pub fn timeouts(&self) -> Result<Timeouts, ConfigError> {
        let request: u64 = non_zero(self.request_timeout_ms, "REQUEST_TIMEOUT_MS")?;
        let search: u64 = non_zero(
            self.search_timeout_ms.unwrap_or(request),
            "SEARCH_TIMEOUT_MS",
        )?;
        let batch: u64 = non_zero(self.batch_timeout_ms.unwrap_or(request), "BATCH_TIMEOUT_MS")?;
        Ok(Timeouts {
            request: Duration::from_millis(request),
            search: Duration::from_millis(search),
            batch: Duration::from_millis(batch),
        })
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroDuration`] for a zero TTL.
    pub fn cache_ttl(&self) -> Result<Duration, ConfigError> {
        Ok(Duration::from_secs(non_zero(
            self.cache_ttl_secs,
            "CACHE_TTL_SECS",
        )?))
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroDuration`] for a zero interval.
    pub fn sweep_interval(&self) -> Result<Duration, ConfigError> {
        Ok(Duration::from_secs(non_zero(
            self.cache_sweep_interval_secs,
            "CACHE_SWEEP_INTERVAL_SECS",
        )?))
    }
}
