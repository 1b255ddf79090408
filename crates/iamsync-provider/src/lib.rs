//! # iamsync-provider -- Identity provider collaborators
//!
//! The reconciler needs exactly two things from the cloud provider:
//!
//! - **Directory**: the complete current list of IAM users and groups,
//!   served a page at a time with a continuation `Marker`.
//! - **Audit trail**: CloudTrail events of one name (`DeleteUser`,
//!   `DeleteGroup`) inside a time window, served a page at a time with a
//!   `NextToken`.
//!
//! Both are traits ([`Directory`], [`AuditTrail`]) so the reconciler can run
//! against the live AWS APIs ([`AwsProvider`]) or against in-memory fixtures
//! ([`mock::MockDirectory`], [`mock::MockAuditTrail`]).
//!
//! ## Pagination
//!
//! Callers never loop over pages themselves. [`list_all_users`],
//! [`list_all_groups`], and [`lookup_all_events`] accumulate every page
//! before returning, so a failure on page N discards pages 1..N instead of
//! letting the caller apply a partial listing.
//!
//! ## Retries
//!
//! None are added here. Whatever the AWS SDK's default retry strategy does
//! is all the retrying a run gets.

pub mod audit;
pub mod aws;
pub mod config;
pub mod directory;
pub mod error;
pub mod mock;
pub mod paginate;

pub use audit::{lookup_all_events, AuditTrail, EventQuery};
pub use aws::{AwsProvider, CloudTrailAuditTrail, IamDirectory};
pub use config::{ProviderConfig, ProviderConfigError};
pub use directory::{list_all_groups, list_all_users, Directory};
pub use error::ProviderError;
pub use paginate::{collect_pages, Page};
