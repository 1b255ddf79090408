//! Store error types.

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The connection could not be established (unreachable host, bad credentials, TLS).
    #[error("failed to connect to postgres at {host}:{port}/{database}: {source}")]
    Connect {
        host: String,
        port: u16,
        database: String,
        #[source]
        source: sqlx::Error,
    },
    /// A statement failed.
    #[error("{statement} on {table} failed: {source}")]
    Query {
        statement: &'static str,
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },
    /// A column the record type requires was NULL.
    #[error("{table}.{column} is NULL for row {id}")]
    NullColumn {
        table: &'static str,
        column: &'static str,
        id: String,
    },
    /// The table has not been created yet.
    #[error("table {0} does not exist")]
    MissingTable(&'static str),
    /// The connection was already released.
    #[error("store connection is closed")]
    Closed,
    /// Closing the connection failed. The connection is dropped regardless.
    #[error("failed to close store connection: {0}")]
    Close(#[source] sqlx::Error),
}
