//! Counts collected during a run.

use iamsync_core::EntityKind;
use serde::Serialize;

/// What one kind's pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindReport {
    /// Deletion events returned for the lookback window.
    pub events_seen: usize,
    /// Events recording a failed delete call.
    pub events_skipped: usize,
    /// Rows flipped to deleted by the deletion sweep.
    pub rows_marked_deleted: u64,
    pub entities_listed: usize,
    pub rows_upserted: usize,
    /// Rows flipped to deleted by the missing-entity pass.
    pub rows_marked_missing: u64,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub users: KindReport,
    pub groups: KindReport,
}

impl RunReport {
    pub fn kind_mut(&mut self, kind: EntityKind) -> &mut KindReport {
        match kind {
            EntityKind::User => &mut self.users,
            EntityKind::Group => &mut self.groups,
        }
    }

    /// The whole report as one JSON value, for structured logs.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
