//! # The Reconciliation Run
//!
//! For each kind, users first and then groups, strictly in sequence:
//!
//! 1. ensure the kind's table exists,
//! 2. **deletion sweep**: soft-delete rows named by `DeleteUser` /
//!    `DeleteGroup` events in the last 24 hours,
//! 3. **listing sync**: page through the full provider listing, then upsert
//!    every entity (clearing `isDeleted`),
//! 4. optionally, the **missing-entity pass**: soft-delete active rows that
//!    the (non-empty) listing no longer contains.
//!
//! The sweep runs before the sync so an entity deleted and recreated inside
//! the window ends up active. Any error aborts the whole run; statements
//! already executed stay committed. The store is closed exactly once, on
//! every path out of [`Reconciler::run`].

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use iamsync_core::{DeletionSignal, EntityKind, ListedEntity, LookbackWindow};
use iamsync_provider::{
    list_all_groups, list_all_users, lookup_all_events, AuditTrail, Directory, EventQuery,
};
use iamsync_store::SyncStore;
use tracing::{debug, error, info, instrument, warn};

use crate::error::SyncError;
use crate::report::{KindReport, RunReport};

/// Owns the three collaborators for the duration of one run.
pub struct Reconciler<S, D, A> {
    store: S,
    directory: D,
    audit: A,
    mark_missing: bool,
}

impl<S, D, A> Reconciler<S, D, A>
where
    S: SyncStore,
    D: Directory,
    A: AuditTrail,
{
    pub fn new(store: S, directory: D, audit: A) -> Self {
        Self {
            store,
            directory,
            audit,
            mark_missing: false,
        }
    }

    /// Enable the missing-entity pass.
    pub fn with_mark_missing(mut self, enabled: bool) -> Self {
        self.mark_missing = enabled;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn audit_trail(&self) -> &A {
        &self.audit
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Reconcile both kinds against the current time.
    ///
    /// The store is closed before this returns, so a `Reconciler` runs once.
    pub async fn run(&mut self) -> Result<RunReport, SyncError> {
        self.run_at(Utc::now()).await
    }

    /// Reconcile both kinds with `now` as the end of the lookback window and
    /// the `LastSynced` value of every upsert.
    pub async fn run_at(&mut self, now: DateTime<Utc>) -> Result<RunReport, SyncError> {
        let outcome = self.reconcile(now).await;
        let closed = self.store.close().await;

        match (outcome, closed) {
            (Ok(report), Ok(())) => {
                info!(report = %report.to_json(), "IAM sync completed successfully");
                Ok(report)
            }
            (Ok(_), Err(e)) => {
                error!(error = %e, "IAM sync failed while closing the store");
                Err(e.into())
            }
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    warn!(error = %close_err, "failed to close store after run failure");
                }
                error!(error = %e, "IAM sync failed");
                Err(e)
            }
        }
    }

    async fn reconcile(&mut self, now: DateTime<Utc>) -> Result<RunReport, SyncError> {
        let window = LookbackWindow::ending_at(now);
        info!(
            directory = self.directory.directory_name(),
            trail = self.audit.trail_name(),
            window_start = %window.start,
            window_end = %window.end,
            mark_missing = self.mark_missing,
            "Starting IAM sync"
        );

        let mut report = RunReport::default();
        for kind in EntityKind::ALL {
            let kind_report = report.kind_mut(kind);
            self.reconcile_kind(kind, window, now, kind_report).await?;
        }
        Ok(report)
    }

    #[instrument(skip_all, fields(kind = %kind))]
    async fn reconcile_kind(
        &mut self,
        kind: EntityKind,
        window: LookbackWindow,
        now: DateTime<Utc>,
        report: &mut KindReport,
    ) -> Result<(), SyncError> {
        self.store.ensure_table(kind).await?;
        self.sweep_deletions(kind, window, report).await?;
        let listed = self.sync_listing(kind, now, report).await?;
        if self.mark_missing {
            self.mark_missing_rows(kind, &listed, report).await?;
        }
        Ok(())
    }

    /// Step 2. Every event is parsed before any row is touched.
    async fn sweep_deletions(
        &mut self,
        kind: EntityKind,
        window: LookbackWindow,
        report: &mut KindReport,
    ) -> Result<(), SyncError> {
        let query = EventQuery::deletions(kind, window);
        let events = lookup_all_events(&self.audit, &query).await?;
        report.events_seen = events.len();

        let signals = events
            .iter()
            .map(|event| event.deletion_signal(kind))
            .collect::<Result<Vec<_>, _>>()?;

        for signal in signals {
            match signal {
                DeletionSignal::Deleted(name) => {
                    let changed = self.store.mark_deleted_by_name(kind, &name).await?;
                    report.rows_marked_deleted += changed;
                    if changed > 0 {
                        info!(rows = changed, "Marked {kind} {name} as deleted");
                    } else {
                        debug!("no active {kind} row named {name}");
                    }
                }
                DeletionSignal::Failed { name, error_code } => {
                    report.events_skipped += 1;
                    warn!(
                        error_code = %error_code,
                        "skipping failed {} call for {}",
                        kind.delete_event_name(),
                        name.as_deref().unwrap_or("<unknown>")
                    );
                }
            }
        }
        Ok(())
    }

    /// Step 3. Returns the identifiers that were listed.
    async fn sync_listing(
        &mut self,
        kind: EntityKind,
        now: DateTime<Utc>,
        report: &mut KindReport,
    ) -> Result<HashSet<String>, SyncError> {
        let listed = match kind {
            EntityKind::User => {
                let users = list_all_users(&self.directory).await?;
                report.entities_listed = users.len();
                for user in &users {
                    self.store.upsert_user(user, now).await?;
                    report.rows_upserted += 1;
                    debug!(id = user.id(), name = user.name(), "upserted user");
                }
                identifiers(&users)
            }
            EntityKind::Group => {
                let groups = list_all_groups(&self.directory).await?;
                report.entities_listed = groups.len();
                for group in &groups {
                    self.store.upsert_group(group, now).await?;
                    report.rows_upserted += 1;
                    debug!(id = group.id(), name = group.name(), "upserted group");
                }
                identifiers(&groups)
            }
        };
        info!(listed = report.entities_listed, "synced {kind} listing");
        Ok(listed)
    }

    /// Step 4. Never runs against an empty listing.
    async fn mark_missing_rows(
        &mut self,
        kind: EntityKind,
        listed: &HashSet<String>,
        report: &mut KindReport,
    ) -> Result<(), SyncError> {
        if listed.is_empty() {
            warn!("{kind} listing was empty; skipping missing-entity pass");
            return Ok(());
        }

        for id in self.store.active_ids(kind).await? {
            if listed.contains(&id) {
                continue;
            }
            let changed = self.store.mark_deleted_by_id(kind, &id).await?;
            report.rows_marked_missing += changed;
            if changed > 0 {
                info!("Marked missing {kind} {id} as deleted");
            }
        }
        Ok(())
    }
}

fn identifiers<E: ListedEntity>(entities: &[E]) -> HashSet<String> {
    entities.iter().map(|e| e.id().to_string()).collect()
}
