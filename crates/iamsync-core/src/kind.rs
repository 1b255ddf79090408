//! # Entity Kinds
//!
//! The reconciler handles two kinds of IAM entity. Each kind owns its table,
//! its identifier and name columns, the CloudTrail event that records its
//! deletion, and the request parameter inside that event naming the entity.
//!
//! Every per-kind difference in the workspace is routed through this enum so
//! that adding a kind forces every consumer to handle it.

use std::fmt;

/// An IAM entity kind reconciled into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// IAM users, stored in `iam_users`.
    User,
    /// IAM groups, stored in `iam_groups`.
    Group,
}

impl EntityKind {
    /// All kinds, in reconciliation order.
    pub const ALL: [EntityKind; 2] = [EntityKind::User, EntityKind::Group];

    /// Store table holding records of this kind.
    pub fn table(self) -> &'static str {
        match self {
            Self::User => "iam_users",
            Self::Group => "iam_groups",
        }
    }

    /// Primary-key column; the upsert conflict target.
    pub fn id_column(self) -> &'static str {
        match self {
            Self::User => "UserId",
            Self::Group => "GroupId",
        }
    }

    /// Display-name column matched by the deletion sweep.
    pub fn name_column(self) -> &'static str {
        match self {
            Self::User => "UserName",
            Self::Group => "GroupName",
        }
    }

    /// CloudTrail `EventName` recording a deletion of this kind.
    pub fn delete_event_name(self) -> &'static str {
        match self {
            Self::User => "DeleteUser",
            Self::Group => "DeleteGroup",
        }
    }

    /// Key under `requestParameters` carrying the deleted entity's name.
    pub fn request_parameter(self) -> &'static str {
        match self {
            Self::User => "userName",
            Self::Group => "groupName",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Group => write!(f, "group"),
        }
    }
}
