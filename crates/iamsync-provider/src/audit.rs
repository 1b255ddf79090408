//! Audit-log lookup of deletion events.

use async_trait::async_trait;
use iamsync_core::{AuditEvent, EntityKind, LookbackWindow};

use crate::error::ProviderError;
use crate::paginate::{collect_pages, Page};

/// Events with one name inside one time window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    /// CloudTrail `EventName` to match exactly.
    pub event_name: String,
    pub window: LookbackWindow,
}

impl EventQuery {
    /// Deletion events for `kind` inside `window`.
    pub fn deletions(kind: EntityKind, window: LookbackWindow) -> Self {
        Self {
            event_name: kind.delete_event_name().to_string(),
            window,
        }
    }
}

/// Source of management events.
#[async_trait]
pub trait AuditTrail: Send + Sync {
    /// Fetch one page of events matching `query`, starting after `next_token`.
    async fn lookup_events_page(
        &self,
        query: &EventQuery,
        next_token: Option<String>,
    ) -> Result<Page<AuditEvent>, ProviderError>;

    /// Human-readable name of this implementation, for logs.
    fn trail_name(&self) -> &str;
}

/// Every event matching `query`, across all pages.
pub async fn lookup_all_events<A: AuditTrail + ?Sized>(
    trail: &A,
    query: &EventQuery,
) -> Result<Vec<AuditEvent>, ProviderError> {
    collect_pages("LookupEvents", |token| trail.lookup_events_page(query, token)).await
}
