//! Provider configuration.
//!
//! Credentials are never configured here: the AWS SDK resolves them from the
//! ambient chain (environment, profile, instance or task role). Only the
//! region and the per-operation timeout can be overridden.

/// Configuration for the AWS identity provider clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Region override. `None` defers to the ambient chain (`AWS_REGION`, profile).
    pub region: Option<String>,
    /// Per-operation timeout in seconds, covering all SDK retry attempts.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            region: None,
            timeout_secs: 30,
        }
    }
}

impl ProviderConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `IAMSYNC_AWS_REGION` (default: ambient chain)
    /// - `IAMSYNC_AWS_TIMEOUT_SECS` (default: 30, must be a positive integer)
    pub fn from_env() -> Result<Self, ProviderConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProviderConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let region = lookup("IAMSYNC_AWS_REGION")
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        let timeout_secs = match lookup("IAMSYNC_AWS_TIMEOUT_SECS") {
            Some(raw) => parse_timeout(&raw)?,
            None => Self::default().timeout_secs,
        };

        Ok(Self {
            region,
            timeout_secs,
        })
    }
}

fn parse_timeout(raw: &str) -> Result<u64, ProviderConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ProviderConfigError::InvalidValue {
            var: "IAMSYNC_AWS_TIMEOUT_SECS",
            value: raw.to_string(),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ProviderConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_defers_region_to_ambient_chain() {
        let cfg = ProviderConfig::default();
        assert!(cfg.region.is_none());
        assert_eq!(cfg.timeout_secs, 30);
    }

    #[test]
    fn parse_timeout_accepts_positive_integers() {
        assert_eq!(parse_timeout("45").unwrap(), 45);
        assert_eq!(parse_timeout(" 5 ").unwrap(), 5);
    }

    #[test]
    fn parse_timeout_rejects_zero_and_garbage() {
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("-1").is_err());
        assert!(parse_timeout("soon").is_err());
    }

    #[test]
    fn blank_region_falls_back_to_ambient_chain() {
        let cfg = ProviderConfig::from_lookup(|var| match var {
            "IAMSYNC_AWS_REGION" => Some("  ".to_string()),
            "IAMSYNC_AWS_TIMEOUT_SECS" => Some("12".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(cfg.region.is_none());
        assert_eq!(cfg.timeout_secs, 12);
    }
}
