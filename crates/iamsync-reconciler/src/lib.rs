//! # iamsync-reconciler -- IAM Inventory Reconciliation
//!
//! Brings the `iam_users` and `iam_groups` tables in line with the identity
//! provider in one sequential batch run: a 24-hour deletion-event sweep
//! followed by a full, paginated listing sync for each kind.
//!
//! The [`Reconciler`] is generic over its three collaborators so the same
//! procedure runs against AWS and Postgres in the `iamsync` binary and
//! against in-memory fixtures in tests.
//!
//! ## Crate Policy
//!
//! - No retries and no concurrency: every provider call and statement is
//!   awaited in order on one connection.
//! - Any failure aborts the run. Rows already written stay written.
//! - The store connection is closed exactly once per run.

pub mod config;
pub mod error;
pub mod reconciler;
pub mod report;

pub use config::{LogFormat, SyncConfig};
pub use error::{ConfigError, SyncError};
pub use reconciler::Reconciler;
pub use report::{KindReport, RunReport};
