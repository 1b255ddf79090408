//! Process configuration, read once at startup.

use iamsync_provider::ProviderConfig;
use iamsync_store::StoreConfig;

use crate::error::ConfigError;

/// Log output format for the binary's subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Everything a run needs besides AWS credentials.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub store: StoreConfig,
    pub provider: ProviderConfig,
    /// Soft-delete active rows absent from a non-empty listing.
    pub mark_missing: bool,
    pub log_format: LogFormat,
}

impl SyncConfig {
    /// Load and validate configuration from environment variables.
    ///
    /// Besides the `PG*` and `IAMSYNC_AWS_*` variables read by the store and
    /// provider configs:
    /// - `IAMSYNC_MARK_MISSING` (default: false)
    /// - `IAMSYNC_LOG_FORMAT` (`text` or `json`, default: text)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mark_missing = match lookup("IAMSYNC_MARK_MISSING") {
            Some(raw) => parse_bool("IAMSYNC_MARK_MISSING", &raw)?,
            None => false,
        };
        let log_format = match lookup("IAMSYNC_LOG_FORMAT") {
            Some(raw) => parse_log_format(&raw)?,
            None => LogFormat::default(),
        };

        Ok(Self {
            store: StoreConfig::from_lookup(&lookup)?,
            provider: ProviderConfig::from_lookup(&lookup)?,
            mark_missing,
            log_format,
        })
    }
}

/// Log format alone, for initializing the subscriber before the rest of the
/// configuration is validated. Unknown values fall back to text.
pub fn log_format_from_env() -> LogFormat {
    std::env::var("IAMSYNC_LOG_FORMAT")
        .ok()
        .and_then(|raw| parse_log_format(&raw).ok())
        .unwrap_or_default()
}

/// The `.env` load error worth reporting, if any. An absent file is normal
/// in deployed environments; an unreadable or malformed one is not.
pub fn env_file_failure(
    loaded: &Result<std::path::PathBuf, dotenvy::Error>,
) -> Option<&dotenvy::Error> {
    match loaded {
        Err(e) if !e.not_found() => Some(e),
        _ => None,
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: raw.to_string(),
        }),
    }
}

fn parse_log_format(raw: &str) -> Result<LogFormat, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "text" => Ok(LogFormat::Text),
        "json" => Ok(LogFormat::Json),
        _ => Err(ConfigError::InvalidValue {
            var: "IAMSYNC_LOG_FORMAT",
            value: raw.to_string(),
        }),
    }
}
