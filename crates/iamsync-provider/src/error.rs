//! Provider error types.

/// Errors from identity provider calls.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider rejected or failed the call (auth, throttling, network).
    #[error("{operation} failed: {message}")]
    Api {
        operation: &'static str,
        message: String,
    },
    /// A response lacked a field the reconciler cannot do without.
    #[error("{operation} response is missing {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },
    /// A listing handed back the marker it was just called with.
    #[error("{operation} returned continuation marker {marker:?} twice; aborting pagination")]
    PaginationStalled {
        operation: &'static str,
        marker: String,
    },
    /// The request could not be built.
    #[error("invalid {operation} request: {message}")]
    InvalidRequest {
        operation: &'static str,
        message: String,
    },
}
