//! In-memory [`SyncStore`].
//!
//! Mirrors the Postgres row contract over two `BTreeMap`s and records every
//! call so tests can assert on ordering, on the number of statements issued,
//! and on how often the connection was released.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use iamsync_core::{EntityKind, GroupRecord, IamGroup, IamUser, UserRecord};

use crate::error::StoreError;
use crate::store::SyncStore;

/// One call made against a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    EnsureTable(EntityKind),
    MarkDeletedByName(EntityKind, String),
    MarkDeletedById(EntityKind, String),
    ActiveIds(EntityKind),
    Upsert(EntityKind, String),
    Get(EntityKind, String),
    Close,
}

impl StoreCall {
    fn statement(&self) -> &'static str {
        match self {
            Self::EnsureTable(_) => "CREATE TABLE",
            Self::MarkDeletedByName(..) | Self::MarkDeletedById(..) => "UPDATE",
            Self::Upsert(..) => "INSERT",
            Self::ActiveIds(_) | Self::Get(..) => "SELECT",
            Self::Close => "CLOSE",
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: BTreeMap<String, UserRecord>,
    groups: BTreeMap<String, GroupRecord>,
    tables: BTreeSet<EntityKind>,
    calls: Vec<StoreCall>,
    statements: usize,
    fail_on: Option<usize>,
    closed: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pre-existing row. Creates the users table.
    pub fn seed_user(mut self, record: UserRecord) -> Self {
        self.tables.insert(EntityKind::User);
        self.users.insert(record.user_id.clone(), record);
        self
    }

    /// Insert a pre-existing row. Creates the groups table.
    pub fn seed_group(mut self, record: GroupRecord) -> Self {
        self.tables.insert(EntityKind::Group);
        self.groups.insert(record.group_id.clone(), record);
        self
    }

    /// Make the `n`th statement (1-based, counting every call except
    /// `close`) fail with a query error.
    pub fn fail_on_statement(mut self, n: usize) -> Self {
        self.fail_on = Some(n);
        self
    }

    /// A new connection to the same data: clears the closed flag and keeps
    /// rows, tables, and the call log.
    pub fn reopen(mut self) -> Self {
        self.closed = false;
        self
    }

    pub fn users(&self) -> &BTreeMap<String, UserRecord> {
        &self.users
    }

    pub fn groups(&self) -> &BTreeMap<String, GroupRecord> {
        &self.groups
    }

    pub fn user(&self, user_id: &str) -> Option<&UserRecord> {
        self.users.get(user_id)
    }

    pub fn group(&self, group_id: &str) -> Option<&GroupRecord> {
        self.groups.get(group_id)
    }

    pub fn has_table(&self, kind: EntityKind) -> bool {
        self.tables.contains(&kind)
    }

    /// Every call in the order it was made, including rejected ones.
    pub fn calls(&self) -> &[StoreCall] {
        &self.calls
    }

    /// Number of statements issued (excludes `close`).
    pub fn statements(&self) -> usize {
        self.statements
    }

    /// Number of times `close` was called.
    pub fn close_calls(&self) -> usize {
        self.calls.iter().filter(|c| **c == StoreCall::Close).count()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn begin(&mut self, kind: EntityKind, call: StoreCall) -> Result<(), StoreError> {
        let statement = call.statement();
        let creates_table = matches!(call, StoreCall::EnsureTable(_));
        self.calls.push(call);

        if self.closed {
            return Err(StoreError::Closed);
        }
        self.statements += 1;
        if self.fail_on == Some(self.statements) {
            return Err(StoreError::Query {
                statement,
                table: kind.table(),
                source: sqlx::Error::Protocol("injected failure".into()),
            });
        }
        if !creates_table && !self.tables.contains(&kind) {
            return Err(StoreError::MissingTable(kind.table()));
        }
        Ok(())
    }
}

#[async_trait]
impl SyncStore for MemoryStore {
    async fn ensure_table(&mut self, kind: EntityKind) -> Result<(), StoreError> {
        self.begin(kind, StoreCall::EnsureTable(kind))?;
        self.tables.insert(kind);
        Ok(())
    }

    async fn mark_deleted_by_name(
        &mut self,
        kind: EntityKind,
        name: &str,
    ) -> Result<u64, StoreError> {
        self.begin(kind, StoreCall::MarkDeletedByName(kind, name.to_string()))?;
        let mut changed = 0;
        match kind {
            EntityKind::User => {
                for row in self.users.values_mut() {
                    if row.user_name == name && !row.is_deleted {
                        row.is_deleted = true;
                        changed += 1;
                    }
                }
            }
            EntityKind::Group => {
                for row in self.groups.values_mut() {
                    if row.group_name == name && !row.is_deleted {
                        row.is_deleted = true;
                        changed += 1;
                    }
                }
            }
        }
        Ok(changed)
    }

    async fn mark_deleted_by_id(&mut self, kind: EntityKind, id: &str) -> Result<u64, StoreError> {
        self.begin(kind, StoreCall::MarkDeletedById(kind, id.to_string()))?;
        let flag = match kind {
            EntityKind::User => self.users.get_mut(id).map(|r| &mut r.is_deleted),
            EntityKind::Group => self.groups.get_mut(id).map(|r| &mut r.is_deleted),
        };
        match flag {
            Some(deleted) if !*deleted => {
                *deleted = true;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn active_ids(&mut self, kind: EntityKind) -> Result<Vec<String>, StoreError> {
        self.begin(kind, StoreCall::ActiveIds(kind))?;
        let ids = match kind {
            EntityKind::User => self
                .users
                .values()
                .filter(|r| !r.is_deleted)
                .map(|r| r.user_id.clone())
                .collect(),
            EntityKind::Group => self
                .groups
                .values()
                .filter(|r| !r.is_deleted)
                .map(|r| r.group_id.clone())
                .collect(),
        };
        Ok(ids)
    }

    async fn upsert_user(
        &mut self,
        user: &IamUser,
        synced_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.begin(
            EntityKind::User,
            StoreCall::Upsert(EntityKind::User, user.user_id.clone()),
        )?;
        self.users
            .insert(user.user_id.clone(), UserRecord::synced(user, synced_at));
        Ok(())
    }

    async fn upsert_group(
        &mut self,
        group: &IamGroup,
        synced_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.begin(
            EntityKind::Group,
            StoreCall::Upsert(EntityKind::Group, group.group_id.clone()),
        )?;
        self.groups
            .insert(group.group_id.clone(), GroupRecord::synced(group, synced_at));
        Ok(())
    }

    async fn get_user(&mut self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        self.begin(
            EntityKind::User,
            StoreCall::Get(EntityKind::User, user_id.to_string()),
        )?;
        Ok(self.users.get(user_id).cloned())
    }

    async fn get_group(&mut self, group_id: &str) -> Result<Option<GroupRecord>, StoreError> {
        self.begin(
            EntityKind::Group,
            StoreCall::Get(EntityKind::Group, group_id.to_string()),
        )?;
        Ok(self.groups.get(group_id).cloned())
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        self.calls.push(StoreCall::Close);
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, day, 12, 0, 0).unwrap()
    }

    fn user(id: &str, name: &str) -> IamUser {
        IamUser {
            user_id: id.into(),
            user_name: name.into(),
            arn: format!("arn:aws:iam::123456789012:user/{name}"),
            create_date: at(1),
            password_last_used: None,
        }
    }

    fn group(id: &str, name: &str) -> IamGroup {
        IamGroup {
            group_id: id.into(),
            group_name: name.into(),
            arn: format!("arn:aws:iam::123456789012:group/{name}"),
            create_date: at(1),
        }
    }

    #[tokio::test]
    async fn statements_before_table_creation_fail() {
        let mut store = MemoryStore::new();
        let err = store.upsert_user(&user("u1", "alice"), at(2)).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingTable("iam_users")));

        store.ensure_table(EntityKind::User).await.unwrap();
        store.upsert_user(&user("u1", "alice"), at(2)).await.unwrap();
        assert!(store.user("u1").is_some());
    }

    #[tokio::test]
    async fn upsert_overwrites_and_resurrects() {
        let mut store = MemoryStore::new();
        store.ensure_table(EntityKind::User).await.unwrap();
        store.upsert_user(&user("u1", "alice"), at(2)).await.unwrap();
        assert_eq!(store.mark_deleted_by_name(EntityKind::User, "alice").await.unwrap(), 1);
        assert!(store.user("u1").unwrap().is_deleted);

        store.upsert_user(&user("u1", "alice2"), at(3)).await.unwrap();
        let row = store.user("u1").unwrap();
        assert!(!row.is_deleted);
        assert_eq!(row.user_name, "alice2");
        assert_eq!(row.last_synced, at(3));
        assert_eq!(store.users().len(), 1);
    }

    #[tokio::test]
    async fn soft_delete_only_counts_rows_that_change() {
        let mut store = MemoryStore::new();
        store.ensure_table(EntityKind::Group).await.unwrap();
        store.upsert_group(&group("g1", "ops"), at(2)).await.unwrap();
        store.upsert_group(&group("g2", "ops"), at(2)).await.unwrap();
        store.upsert_group(&group("g3", "dev"), at(2)).await.unwrap();

        assert_eq!(store.mark_deleted_by_name(EntityKind::Group, "ops").await.unwrap(), 2);
        assert_eq!(store.mark_deleted_by_name(EntityKind::Group, "ops").await.unwrap(), 0);
        assert_eq!(store.mark_deleted_by_name(EntityKind::Group, "ghost").await.unwrap(), 0);
        assert_eq!(store.mark_deleted_by_id(EntityKind::Group, "g3").await.unwrap(), 1);
        assert_eq!(store.mark_deleted_by_id(EntityKind::Group, "g3").await.unwrap(), 0);
        assert!(store.active_ids(EntityKind::Group).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn soft_delete_leaves_last_synced_alone() {
        let mut store = MemoryStore::new();
        store.ensure_table(EntityKind::User).await.unwrap();
        store.upsert_user(&user("u1", "alice"), at(2)).await.unwrap();
        store.mark_deleted_by_name(EntityKind::User, "alice").await.unwrap();
        assert_eq!(store.user("u1").unwrap().last_synced, at(2));
    }

    #[tokio::test]
    async fn closed_store_rejects_statements_and_close_is_idempotent() {
        let mut store = MemoryStore::new();
        store.ensure_table(EntityKind::User).await.unwrap();
        store.close().await.unwrap();
        store.close().await.unwrap();
        assert!(store.is_closed());
        assert_eq!(store.close_calls(), 2);
        assert!(matches!(
            store.active_ids(EntityKind::User).await,
            Err(StoreError::Closed)
        ));
        assert_eq!(store.statements(), 1);
    }

    #[tokio::test]
    async fn injected_failure_hits_the_requested_statement() {
        let mut store = MemoryStore::new().fail_on_statement(2);
        store.ensure_table(EntityKind::User).await.unwrap();
        let err = store.upsert_user(&user("u1", "alice"), at(2)).await.unwrap_err();
        assert!(matches!(err, StoreError::Query { statement: "INSERT", table: "iam_users", .. }));
        assert!(store.user("u1").is_none());
        store.upsert_user(&user("u1", "alice"), at(2)).await.unwrap();
    }

    #[tokio::test]
    async fn seeded_rows_are_visible() {
        let seeded = UserRecord {
            is_deleted: true,
            ..UserRecord::synced(&user("u9", "old"), at(1))
        };
        let mut store = MemoryStore::new().seed_user(seeded.clone());
        assert!(store.has_table(EntityKind::User));
        assert!(!store.has_table(EntityKind::Group));
        assert_eq!(store.get_user("u9").await.unwrap(), Some(seeded));
        assert!(store.active_ids(EntityKind::User).await.unwrap().is_empty());
    }
}
