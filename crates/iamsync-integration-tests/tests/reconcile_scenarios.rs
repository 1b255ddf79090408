//! End-to-end reconciliation runs over the in-memory collaborators.

mod common;

use chrono::Duration;
use common::*;
use iamsync_core::{EntityKind, UserRecord};
use iamsync_provider::mock::{
    deletion_event, failed_deletion_event, rejected_deletion_event, MockAuditTrail, MockDirectory,
};
use iamsync_reconciler::Reconciler;
use iamsync_store::MemoryStore;

#[tokio::test]
async fn first_sighting_creates_one_active_row() {
    let directory = MockDirectory::new().with_users(vec![user("u1", "alice")]);

    let (reconciler, result) = run(MemoryStore::new(), directory, MockAuditTrail::new()).await;
    result.unwrap();

    let store = reconciler.store();
    assert_eq!(store.users().len(), 1);
    let row = store.user("u1").unwrap();
    assert_eq!(row.user_name, "alice");
    assert!(!row.is_deleted);
    assert_eq!(row.last_synced, now());
    assert!(store.groups().is_empty());
    assert!(store.has_table(EntityKind::Group));
}

#[tokio::test]
async fn deletion_event_marks_unlisted_row_deleted() {
    let store = MemoryStore::new().seed_user(stored_user("u1", "alice", 2));
    let trail =
        MockAuditTrail::new().with_event(deletion_event(EntityKind::User, "alice", hours_ago(3)));

    let (reconciler, result) = run(store, MockDirectory::new(), trail).await;
    let report = result.unwrap();

    let row = reconciler.store().user("u1").unwrap();
    assert!(row.is_deleted);
    assert_eq!(row.last_synced, now() - Duration::days(2));
    assert_eq!(report.users.rows_marked_deleted, 1);
    assert_eq!(reconciler.store().users().len(), 1);
}

#[tokio::test]
async fn listing_presence_wins_over_deletion_event() {
    let store = MemoryStore::new().seed_group(stored_group("g1", "ops", 1));
    let directory = MockDirectory::new().with_groups(vec![group("g1", "ops")]);
    let trail =
        MockAuditTrail::new().with_event(deletion_event(EntityKind::Group, "ops", hours_ago(1)));

    let (reconciler, result) = run(store, directory, trail).await;
    let report = result.unwrap();

    let row = reconciler.store().group("g1").unwrap();
    assert!(!row.is_deleted);
    assert_eq!(row.last_synced, now());
    assert_eq!(report.groups.rows_marked_deleted, 1);
}

#[tokio::test]
async fn recreated_entity_with_new_id_leaves_old_row_deleted() {
    let store = MemoryStore::new().seed_user(stored_user("u-old", "alice", 5));
    let directory = MockDirectory::new().with_users(vec![user("u-new", "alice")]);
    let trail =
        MockAuditTrail::new().with_event(deletion_event(EntityKind::User, "alice", hours_ago(4)));

    let (reconciler, result) = run(store, directory, trail).await;
    result.unwrap();

    let store = reconciler.store();
    assert!(store.user("u-old").unwrap().is_deleted);
    assert!(!store.user("u-new").unwrap().is_deleted);
}

#[tokio::test]
async fn previously_deleted_entity_is_resurrected_by_listing() {
    let deleted = UserRecord {
        is_deleted: true,
        ..stored_user("u1", "alice", 30)
    };
    let store = MemoryStore::new().seed_user(deleted);
    let directory = MockDirectory::new().with_users(vec![user("u1", "alice")]);

    let (reconciler, result) = run(store, directory, MockAuditTrail::new()).await;
    result.unwrap();

    assert!(!reconciler.store().user("u1").unwrap().is_deleted);
}

#[tokio::test]
async fn stale_row_has_every_mutable_column_overwritten() {
    let store = MemoryStore::new().seed_user(stored_user("u1", "alice", 10));
    let mut renamed = user("u1", "alice.smith");
    renamed.arn = "arn:aws:iam::123456789012:user/eng/alice.smith".into();
    renamed.password_last_used = Some(hours_ago(6));
    let directory = MockDirectory::new().with_users(vec![renamed.clone()]);

    let (reconciler, result) = run(store, directory, MockAuditTrail::new()).await;
    result.unwrap();

    assert_eq!(
        reconciler.store().user("u1").unwrap(),
        &UserRecord::synced(&renamed, now())
    );
}

#[tokio::test]
async fn second_run_with_unchanged_listing_only_moves_last_synced() {
    let directory = || {
        MockDirectory::new()
            .with_users(vec![user("u1", "alice"), user("u2", "bob")])
            .with_groups(vec![group("g1", "ops")])
    };

    let (first, result) = run(MemoryStore::new(), directory(), MockAuditTrail::new()).await;
    result.unwrap();
    let store = first.into_store();
    let users_before = store.users().clone();
    let groups_before = store.groups().clone();

    let later = now() + Duration::hours(1);
    let mut second = Reconciler::new(store.reopen(), directory(), MockAuditTrail::new());
    second.run_at(later).await.unwrap();

    let store = second.store();
    assert_eq!(store.users().len(), users_before.len());
    for (id, before) in &users_before {
        let after = store.user(id).unwrap();
        assert_eq!(after.last_synced, later);
        assert_eq!(
            UserRecord {
                last_synced: before.last_synced,
                ..after.clone()
            },
            *before
        );
    }
    for (id, before) in &groups_before {
        let after = store.group(id).unwrap();
        assert_eq!(after.group_name, before.group_name);
        assert_eq!(after.is_deleted, before.is_deleted);
    }
}

#[tokio::test]
async fn repeated_deletion_event_is_a_no_op() {
    let store = MemoryStore::new().seed_user(stored_user("u1", "alice", 1));
    let trail = MockAuditTrail::new()
        .with_event(deletion_event(EntityKind::User, "alice", hours_ago(5)))
        .with_event(deletion_event(EntityKind::User, "alice", hours_ago(2)));

    let (reconciler, result) = run(store, MockDirectory::new(), trail).await;
    let report = result.unwrap();

    assert_eq!(report.users.events_seen, 2);
    assert_eq!(report.users.rows_marked_deleted, 1);
    assert!(reconciler.store().user("u1").unwrap().is_deleted);
}

#[tokio::test]
async fn events_outside_the_lookback_window_are_ignored() {
    let store = MemoryStore::new().seed_user(stored_user("u1", "alice", 3));
    let trail =
        MockAuditTrail::new().with_event(deletion_event(EntityKind::User, "alice", hours_ago(25)));

    let (reconciler, result) = run(store, MockDirectory::new(), trail).await;
    let report = result.unwrap();

    assert_eq!(report.users.events_seen, 0);
    assert!(!reconciler.store().user("u1").unwrap().is_deleted);
}

#[tokio::test]
async fn deletion_events_only_affect_their_own_kind() {
    let store = MemoryStore::new()
        .seed_user(stored_user("u1", "shared", 1))
        .seed_group(stored_group("g1", "shared", 1));
    let trail =
        MockAuditTrail::new().with_event(deletion_event(EntityKind::Group, "shared", hours_ago(1)));

    let (reconciler, result) = run(store, MockDirectory::new(), trail).await;
    result.unwrap();

    assert!(!reconciler.store().user("u1").unwrap().is_deleted);
    assert!(reconciler.store().group("g1").unwrap().is_deleted);
}

#[tokio::test]
async fn failed_delete_call_is_skipped() {
    let store = MemoryStore::new().seed_group(stored_group("g1", "admins", 1));
    let trail = MockAuditTrail::new().with_event(failed_deletion_event(
        EntityKind::Group,
        "admins",
        "DeleteConflict",
        hours_ago(2),
    ));

    let (reconciler, result) = run(store, MockDirectory::new(), trail).await;
    let report = result.unwrap();

    assert!(!reconciler.store().group("g1").unwrap().is_deleted);
    assert_eq!(report.groups.events_seen, 1);
    assert_eq!(report.groups.events_skipped, 1);
    assert_eq!(report.groups.rows_marked_deleted, 0);
}

#[tokio::test]
async fn rejected_delete_without_request_parameters_is_skipped() {
    let store = MemoryStore::new().seed_user(stored_user("u1", "alice", 1));
    let trail = MockAuditTrail::new()
        .with_event(rejected_deletion_event(EntityKind::User, "AccessDenied", hours_ago(3)))
        .with_event(deletion_event(EntityKind::User, "alice", hours_ago(1)));

    let (reconciler, result) = run(store, MockDirectory::new(), trail).await;
    let report = result.unwrap();

    assert_eq!(report.users.events_seen, 2);
    assert_eq!(report.users.events_skipped, 1);
    assert_eq!(report.users.rows_marked_deleted, 1);
    assert!(reconciler.store().user("u1").unwrap().is_deleted);
    assert_eq!(reconciler.store().close_calls(), 1);
}

#[tokio::test]
async fn empty_listing_leaves_existing_rows_untouched() {
    let deleted = UserRecord {
        is_deleted: true,
        ..stored_user("u2", "bob", 4)
    };
    let store = MemoryStore::new()
        .seed_user(stored_user("u1", "alice", 4))
        .seed_user(deleted.clone());

    let mut reconciler = Reconciler::new(store, MockDirectory::new(), MockAuditTrail::new())
        .with_mark_missing(true);
    let report = reconciler.run_at(now()).await.unwrap();

    let store = reconciler.store();
    assert_eq!(store.user("u1").unwrap(), &stored_user("u1", "alice", 4));
    assert_eq!(store.user("u2").unwrap(), &deleted);
    assert_eq!(report.users.rows_upserted, 0);
    assert_eq!(report.users.rows_marked_missing, 0);
}

#[tokio::test]
async fn missing_entity_pass_marks_rows_absent_from_listing() {
    let store = MemoryStore::new()
        .seed_user(stored_user("u1", "alice", 2))
        .seed_user(stored_user("u2", "bob", 2))
        .seed_group(stored_group("g1", "ops", 2))
        .seed_group(stored_group("g2", "dev", 2));
    let directory = MockDirectory::new()
        .with_users(vec![user("u1", "alice")])
        .with_groups(vec![group("g2", "dev")]);

    let mut reconciler =
        Reconciler::new(store, directory, MockAuditTrail::new()).with_mark_missing(true);
    let report = reconciler.run_at(now()).await.unwrap();

    let store = reconciler.store();
    let bob = store.user("u2").unwrap();
    assert!(bob.is_deleted);
    assert_eq!(bob.last_synced, now() - Duration::days(2));
    assert!(store.group("g1").unwrap().is_deleted);
    assert!(!store.user("u1").unwrap().is_deleted);
    assert!(!store.group("g2").unwrap().is_deleted);
    assert_eq!(report.users.rows_marked_missing, 1);
    assert_eq!(report.groups.rows_marked_missing, 1);
}

#[tokio::test]
async fn missing_entity_pass_is_off_by_default() {
    let store = MemoryStore::new().seed_user(stored_user("u2", "bob", 2));
    let directory = MockDirectory::new().with_users(vec![user("u1", "alice")]);

    let (reconciler, result) = run(store, directory, MockAuditTrail::new()).await;
    let report = result.unwrap();

    assert!(!reconciler.store().user("u2").unwrap().is_deleted);
    assert_eq!(report.users.rows_marked_missing, 0);
}

#[tokio::test]
async fn deletion_sweep_queries_the_last_24_hours_per_kind() {
    let (reconciler, result) =
        run(MemoryStore::new(), MockDirectory::new(), MockAuditTrail::new()).await;
    result.unwrap();

    let queries = reconciler.audit_trail().queries();
    let names: Vec<_> = queries.iter().map(|q| q.event_name.as_str()).collect();
    assert_eq!(names, ["DeleteUser", "DeleteGroup"]);
    for query in &queries {
        assert_eq!(query.window.end, now());
        assert_eq!(query.window.start, hours_ago(24));
    }
}
