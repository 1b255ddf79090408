//! The store seam used by the reconciler.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use iamsync_core::{EntityKind, GroupRecord, IamGroup, IamUser, UserRecord};

use crate::error::StoreError;

/// Durable home of `iam_users` and `iam_groups`.
///
/// Methods take `&mut self`: a store is a single connection used by a single
/// sequential run. After [`close`](SyncStore::close) every other method
/// returns [`StoreError::Closed`].
#[async_trait]
pub trait SyncStore: Send {
    /// Create the table for `kind` if it does not exist.
    async fn ensure_table(&mut self, kind: EntityKind) -> Result<(), StoreError>;

    /// Set `isDeleted = true` on rows of `kind` named `name` that are not
    /// already deleted. Returns the number of rows that changed.
    async fn mark_deleted_by_name(&mut self, kind: EntityKind, name: &str)
        -> Result<u64, StoreError>;

    /// Set `isDeleted = true` on the non-deleted row of `kind` with identifier `id`.
    async fn mark_deleted_by_id(&mut self, kind: EntityKind, id: &str) -> Result<u64, StoreError>;

    /// Identifiers of every row of `kind` with `isDeleted = false`.
    async fn active_ids(&mut self, kind: EntityKind) -> Result<Vec<String>, StoreError>;

    /// Insert or overwrite the row for `user`, clearing `isDeleted`.
    async fn upsert_user(
        &mut self,
        user: &IamUser,
        synced_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Insert or overwrite the row for `group`, clearing `isDeleted`.
    async fn upsert_group(
        &mut self,
        group: &IamGroup,
        synced_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Fetch one user row.
    async fn get_user(&mut self, user_id: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Fetch one group row.
    async fn get_group(&mut self, group_id: &str) -> Result<Option<GroupRecord>, StoreError>;

    /// Release the connection. Calling it again is a no-op.
    async fn close(&mut self) -> Result<(), StoreError>;
}
