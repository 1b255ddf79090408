//! # IAM Entities and Store Records
//!
//! Two shapes per kind:
//!
//! - **Provider entities** (`IamUser`, `IamGroup`) are what a listing page
//!   returns. They carry no sync metadata.
//! - **Store records** (`UserRecord`, `GroupRecord`) are what a row holds:
//!   the provider fields plus `last_synced` and the `is_deleted` soft-delete
//!   flag.
//!
//! A record is only ever built from an entity by an upsert, which is why the
//! `synced` constructors always clear `is_deleted`.

use chrono::{DateTime, Utc};

use crate::kind::EntityKind;

/// An IAM user as returned by `ListUsers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IamUser {
    /// Stable IAM identifier (`AIDA...`). Never changes for the life of the user.
    pub user_id: String,
    /// Friendly name. Reused if a user is deleted and recreated.
    pub user_name: String,
    pub arn: String,
    pub create_date: DateTime<Utc>,
    /// Last console sign-in. `None` if the user never used a password.
    pub password_last_used: Option<DateTime<Utc>>,
}

/// An IAM group as returned by `ListGroups`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IamGroup {
    /// Stable IAM identifier (`AGPA...`).
    pub group_id: String,
    pub group_name: String,
    pub arn: String,
    pub create_date: DateTime<Utc>,
}

/// A row of `iam_users`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: String,
    pub user_name: String,
    pub arn: String,
    pub create_date: DateTime<Utc>,
    pub password_last_used: Option<DateTime<Utc>>,
    pub last_synced: DateTime<Utc>,
    pub is_deleted: bool,
}

impl UserRecord {
    /// The row an upsert of `user` at `synced_at` leaves behind.
    pub fn synced(user: &IamUser, synced_at: DateTime<Utc>) -> Self {
        Self {
            user_id: user.user_id.clone(),
            user_name: user.user_name.clone(),
            arn: user.arn.clone(),
            create_date: user.create_date,
            password_last_used: user.password_last_used,
            last_synced: synced_at,
            is_deleted: false,
        }
    }
}

/// A row of `iam_groups`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    pub group_id: String,
    pub group_name: String,
    pub arn: String,
    pub create_date: DateTime<Utc>,
    pub last_synced: DateTime<Utc>,
    pub is_deleted: bool,
}

impl GroupRecord {
    /// The row an upsert of `group` at `synced_at` leaves behind.
    pub fn synced(group: &IamGroup, synced_at: DateTime<Utc>) -> Self {
        Self {
            group_id: group.group_id.clone(),
            group_name: group.group_name.clone(),
            arn: group.arn.clone(),
            create_date: group.create_date,
            last_synced: synced_at,
            is_deleted: false,
        }
    }
}

/// Common view over provider entities, used by the kind-generic parts of a run.
pub trait ListedEntity {
    /// The kind this entity belongs to.
    const KIND: EntityKind;

    /// Upsert conflict key.
    fn id(&self) -> &str;

    /// Display name, matched by the deletion sweep.
    fn name(&self) -> &str;
}

impl ListedEntity for IamUser {
    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> &str {
        &self.user_id
    }

    fn name(&self) -> &str {
        &self.user_name
    }
}

impl ListedEntity for IamGroup {
    const KIND: EntityKind = EntityKind::Group;

    fn id(&self) -> &str {
        &self.group_id
    }

    fn name(&self) -> &str {
        &self.group_name
    }
}
