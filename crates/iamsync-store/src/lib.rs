//! # iamsync-store -- Reconciliation Store
//!
//! Persists IAM users and groups into two tables, `iam_users` and
//! `iam_groups`, via SQLx.
//!
//! ## Architecture
//!
//! A run holds exactly **one** connection ([`PgStore`] wraps a single
//! `PgConnection`, not a pool). Every statement of the run goes through it,
//! in order, and [`SyncStore::close`] releases it exactly once. There is no
//! transaction around the run: each statement commits on its own.
//!
//! [`MemoryStore`] implements the same contract over `BTreeMap`s so the
//! reconciler can be exercised without a database.
//!
//! ## Row contract
//!
//! - Upsert conflicts on the identifier, overwrites every other column, and
//!   forces `isDeleted = false`.
//! - Soft deletes only flip `isDeleted` from false to true; they never touch
//!   `LastSynced` and never remove rows.

pub mod config;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod schema;
pub mod store;

pub use config::{StoreConfig, StoreConfigError};
pub use error::StoreError;
pub use memory::{MemoryStore, StoreCall};
pub use postgres::PgStore;
pub use store::SyncStore;
