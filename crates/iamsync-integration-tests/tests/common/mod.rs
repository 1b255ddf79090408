//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use iamsync_core::{GroupRecord, IamGroup, IamUser, UserRecord};
use iamsync_provider::mock::{MockAuditTrail, MockDirectory};
use iamsync_reconciler::Reconciler;
use iamsync_store::MemoryStore;

pub type MockReconciler = Reconciler<MemoryStore, MockDirectory, MockAuditTrail>;

/// Fixed "now" for every run.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 6, 0, 0).unwrap()
}

pub fn hours_ago(hours: i64) -> DateTime<Utc> {
    now() - Duration::hours(hours)
}

pub fn user(id: &str, name: &str) -> IamUser {
    IamUser {
        user_id: id.into(),
        user_name: name.into(),
        arn: format!("arn:aws:iam::123456789012:user/{name}"),
        create_date: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        password_last_used: None,
    }
}

pub fn group(id: &str, name: &str) -> IamGroup {
    IamGroup {
        group_id: id.into(),
        group_name: name.into(),
        arn: format!("arn:aws:iam::123456789012:group/{name}"),
        create_date: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
    }
}

/// A row written by an earlier run, `days` days ago.
pub fn stored_user(id: &str, name: &str, days: i64) -> UserRecord {
    UserRecord::synced(&user(id, name), now() - Duration::days(days))
}

pub fn stored_group(id: &str, name: &str, days: i64) -> GroupRecord {
    GroupRecord::synced(&group(id, name), now() - Duration::days(days))
}

pub async fn run(
    store: MemoryStore,
    directory: MockDirectory,
    trail: MockAuditTrail,
) -> (MockReconciler, Result<iamsync_reconciler::RunReport, iamsync_reconciler::SyncError>) {
    let mut reconciler = Reconciler::new(store, directory, trail);
    let result = reconciler.run_at(now()).await;
    (reconciler, result)
}
