//! SQL text for both tables.
//!
//! Column names are unquoted, so Postgres folds them to lower case
//! (`UserId` is stored as `userid`). Reads alias them back to snake_case
//! for `FromRow`.
//!
//! Timestamps are `TIMESTAMP` (without time zone) holding UTC wall-clock
//! values; callers bind `NaiveDateTime` produced by `naive_utc()`.

use iamsync_core::EntityKind;

/// `CREATE TABLE IF NOT EXISTS` for `kind`.
pub fn create_table(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::User => {
            "CREATE TABLE IF NOT EXISTS iam_users (
                UserId VARCHAR PRIMARY KEY,
                UserName VARCHAR,
                Arn VARCHAR,
                CreateDate TIMESTAMP,
                PasswordLastUsed TIMESTAMP,
                LastSynced TIMESTAMP,
                isDeleted BOOLEAN DEFAULT false
            )"
        }
        EntityKind::Group => {
            "CREATE TABLE IF NOT EXISTS iam_groups (
                GroupId VARCHAR PRIMARY KEY,
                GroupName VARCHAR,
                Arn VARCHAR,
                CreateDate TIMESTAMP,
                LastSynced TIMESTAMP,
                isDeleted BOOLEAN DEFAULT false
            )"
        }
    }
}

/// Soft-delete by display name; `$1` is the name.
pub fn mark_deleted_by_name(kind: EntityKind) -> String {
    format!(
        "UPDATE {} SET isDeleted = true WHERE {} = $1 AND isDeleted = false",
        kind.table(),
        kind.name_column()
    )
}

/// Soft-delete by identifier; `$1` is the identifier.
pub fn mark_deleted_by_id(kind: EntityKind) -> String {
    format!(
        "UPDATE {} SET isDeleted = true WHERE {} = $1 AND isDeleted = false",
        kind.table(),
        kind.id_column()
    )
}

/// Identifiers of non-deleted rows.
pub fn active_ids(kind: EntityKind) -> String {
    format!(
        "SELECT {} FROM {} WHERE isDeleted = false ORDER BY {}",
        kind.id_column(),
        kind.table(),
        kind.id_column()
    )
}

/// Upsert a user: `$1..$6` = id, name, arn, created, password last used, synced.
pub const UPSERT_USER: &str = "INSERT INTO iam_users
        (UserId, UserName, Arn, CreateDate, PasswordLastUsed, LastSynced, isDeleted)
     VALUES ($1, $2, $3, $4, $5, $6, false)
     ON CONFLICT (UserId) DO UPDATE SET
        UserName = EXCLUDED.UserName,
        Arn = EXCLUDED.Arn,
        CreateDate = EXCLUDED.CreateDate,
        PasswordLastUsed = EXCLUDED.PasswordLastUsed,
        LastSynced = EXCLUDED.LastSynced,
        isDeleted = false";

/// Upsert a group: `$1..$5` = id, name, arn, created, synced.
pub const UPSERT_GROUP: &str = "INSERT INTO iam_groups
        (GroupId, GroupName, Arn, CreateDate, LastSynced, isDeleted)
     VALUES ($1, $2, $3, $4, $5, false)
     ON CONFLICT (GroupId) DO UPDATE SET
        GroupName = EXCLUDED.GroupName,
        Arn = EXCLUDED.Arn,
        CreateDate = EXCLUDED.CreateDate,
        LastSynced = EXCLUDED.LastSynced,
        isDeleted = false";

pub const SELECT_USER: &str = "SELECT UserId AS user_id, UserName AS user_name, Arn AS arn,
        CreateDate AS create_date, PasswordLastUsed AS password_last_used,
        LastSynced AS last_synced, isDeleted AS is_deleted
     FROM iam_users WHERE UserId = $1";

pub const SELECT_GROUP: &str = "SELECT GroupId AS group_id, GroupName AS group_name, Arn AS arn,
        CreateDate AS create_date, LastSynced AS last_synced, isDeleted AS is_deleted
     FROM iam_groups WHERE GroupId = $1";
