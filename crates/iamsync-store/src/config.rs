//! Store connection configuration.
//!
//! Read from the standard libpq variables so the same environment works for
//! `psql` and for the reconciler. The connection is encrypted by default
//! without certificate verification (`sslmode=require`); set `PGSSLMODE` to
//! `verify-full` where the server presents a trusted certificate.

use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgSslMode};
use zeroize::Zeroizing;

/// Parameters for the single store connection.
///
/// Custom `Debug` implementation redacts the `password` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Zeroizing<String>,
    pub database: String,
    pub ssl_mode: PgSslMode,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PGHOST` (required)
    /// - `PGPORT` (default: 5432)
    /// - `PGUSER` (required)
    /// - `PGPASSWORD` (required)
    /// - `PGDATABASE` (required)
    /// - `PGSSLMODE` (default: `require`)
    pub fn from_env() -> Result<Self, StoreConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StoreConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| -> Result<String, StoreConfigError> {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or(StoreConfigError::Missing(var))
        };

        let port = match lookup("PGPORT") {
            Some(raw) => match raw.trim().parse::<u16>() {
                Ok(port) if port != 0 => port,
                _ => {
                    return Err(StoreConfigError::InvalidValue {
                        var: "PGPORT",
                        value: raw,
                    })
                }
            },
            None => 5432,
        };

        let ssl_mode = match lookup("PGSSLMODE") {
            Some(raw) => match PgSslMode::from_str(raw.trim()) {
                Ok(mode) => mode,
                Err(_) => {
                    return Err(StoreConfigError::InvalidValue {
                        var: "PGSSLMODE",
                        value: raw,
                    })
                }
            },
            None => PgSslMode::Require,
        };

        Ok(Self {
            host: required("PGHOST")?,
            port,
            user: required("PGUSER")?,
            password: Zeroizing::new(required("PGPASSWORD")?),
            database: required("PGDATABASE")?,
            ssl_mode,
        })
    }

    /// SQLx connect options for this configuration.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new_without_pgpass()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(self.password.as_str())
            .database(&self.database)
            .ssl_mode(self.ssl_mode)
            .application_name("iamsync")
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}
