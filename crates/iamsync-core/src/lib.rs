//! # iamsync-core -- Foundational Types for the IAM Reconciler
//!
//! Defines the vocabulary every other `iamsync-*` crate speaks: which entity
//! kinds are reconciled, what the identity provider returns for each kind,
//! what the store keeps, and how a CloudTrail deletion event names the entity
//! it removed.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `iamsync-*` crates (this is the leaf of the DAG).
//! - No I/O. Provider and store access live in `iamsync-provider` and
//!   `iamsync-store`.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod entity;
pub mod error;
pub mod event;
pub mod kind;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use entity::{GroupRecord, IamGroup, IamUser, ListedEntity, UserRecord};
pub use error::PayloadError;
pub use event::{AuditEvent, DeletionSignal};
pub use kind::EntityKind;
pub use temporal::{LookbackWindow, LOOKBACK_HOURS};
