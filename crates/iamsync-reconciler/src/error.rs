//! Run-level error type.
//!
//! Every failure aborts the run. The variant says which collaborator failed;
//! the entity kind and phase are attached by the reconciler's log context.

use iamsync_core::PayloadError;
use iamsync_provider::{ProviderConfigError, ProviderError};
use iamsync_store::{StoreConfigError, StoreError};

/// A failed reconciliation run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("store: {0}")]
    Store(#[from] StoreError),
    #[error("provider: {0}")]
    Provider(#[from] ProviderError),
    #[error("event payload: {0}")]
    Payload(#[from] PayloadError),
}

/// Invalid process configuration. Raised before any connection is attempted.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Store(#[from] StoreConfigError),
    #[error(transparent)]
    Provider(#[from] ProviderConfigError),
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}
