//! # In-Memory Provider Fixtures
//!
//! `MockDirectory` and `MockAuditTrail` implement the provider traits over
//! fixed data. They paginate with real markers (so multi-page behavior is
//! exercised end to end), apply the query window the way CloudTrail does,
//! and record every request for assertions.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use iamsync_core::{AuditEvent, EntityKind, IamGroup, IamUser};

use crate::audit::{AuditTrail, EventQuery};
use crate::directory::Directory;
use crate::error::ProviderError;
use crate::paginate::Page;

/// Serve page `marker` of `pages`, using `prefix-N` markers.
fn serve_page<T: Clone>(
    pages: &[Vec<T>],
    prefix: &str,
    marker: Option<&str>,
    operation: &'static str,
) -> Result<Page<T>, ProviderError> {
    let index = match marker {
        None => 0,
        Some(m) => m
            .strip_prefix(prefix)
            .and_then(|n| n.strip_prefix('-'))
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| *n < pages.len())
            .ok_or_else(|| ProviderError::Api {
                operation,
                message: format!("unknown marker {m:?}"),
            })?,
    };

    let items = pages.get(index).cloned().unwrap_or_default();
    let next = (index + 1 < pages.len()).then(|| format!("{prefix}-{}", index + 1));
    Ok(Page::new(items, next))
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A directory request recorded by [`MockDirectory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub kind: EntityKind,
    pub marker: Option<String>,
}

/// Fixed user and group listings, served in pages.
#[derive(Debug, Default)]
pub struct MockDirectory {
    user_pages: Vec<Vec<IamUser>>,
    group_pages: Vec<Vec<IamGroup>>,
    fail_users_on_page: Option<usize>,
    fail_groups_on_page: Option<usize>,
    requests: Mutex<Vec<ListingRequest>>,
}

impl MockDirectory {
    /// An empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `users` as a single page.
    pub fn with_users(self, users: Vec<IamUser>) -> Self {
        self.with_user_pages(vec![users])
    }

    /// Serve users split across the given pages.
    pub fn with_user_pages(mut self, pages: Vec<Vec<IamUser>>) -> Self {
        self.user_pages = pages;
        self
    }

    /// Serve `groups` as a single page.
    pub fn with_groups(self, groups: Vec<IamGroup>) -> Self {
        self.with_group_pages(vec![groups])
    }

    /// Serve groups split across the given pages.
    pub fn with_group_pages(mut self, pages: Vec<Vec<IamGroup>>) -> Self {
        self.group_pages = pages;
        self
    }

    /// Fail the user listing when page `index` (zero-based) is requested.
    pub fn fail_users_on_page(mut self, index: usize) -> Self {
        self.fail_users_on_page = Some(index);
        self
    }

    /// Fail the group listing when page `index` (zero-based) is requested.
    pub fn fail_groups_on_page(mut self, index: usize) -> Self {
        self.fail_groups_on_page = Some(index);
        self
    }

    /// Every page request served so far, in order.
    pub fn requests(&self) -> Vec<ListingRequest> {
        lock(&self.requests).clone()
    }

    fn record(&self, kind: EntityKind, marker: &Option<String>) -> usize {
        let mut requests = lock(&self.requests);
        requests.push(ListingRequest {
            kind,
            marker: marker.clone(),
        });
        requests.iter().filter(|r| r.kind == kind).count() - 1
    }
}

#[async_trait]
impl Directory for MockDirectory {
    async fn list_users_page(
        &self,
        marker: Option<String>,
    ) -> Result<Page<IamUser>, ProviderError> {
        let call = self.record(EntityKind::User, &marker);
        if self.fail_users_on_page == Some(call) {
            return Err(ProviderError::Api {
                operation: "ListUsers",
                message: "Throttling: Rate exceeded".into(),
            });
        }
        serve_page(&self.user_pages, "users", marker.as_deref(), "ListUsers")
    }

    async fn list_groups_page(
        &self,
        marker: Option<String>,
    ) -> Result<Page<IamGroup>, ProviderError> {
        let call = self.record(EntityKind::Group, &marker);
        if self.fail_groups_on_page == Some(call) {
            return Err(ProviderError::Api {
                operation: "ListGroups",
                message: "Throttling: Rate exceeded".into(),
            });
        }
        serve_page(&self.group_pages, "groups", marker.as_deref(), "ListGroups")
    }

    fn directory_name(&self) -> &str {
        "MockDirectory"
    }
}

/// Fixed CloudTrail events, filtered by name and window and served in pages.
#[derive(Debug)]
pub struct MockAuditTrail {
    events: HashMap<String, Vec<AuditEvent>>,
    page_size: usize,
    failure: Option<String>,
    queries: Mutex<Vec<EventQuery>>,
}

impl Default for MockAuditTrail {
    fn default() -> Self {
        Self {
            events: HashMap::new(),
            // CloudTrail's own maximum.
            page_size: 50,
            failure: None,
            queries: Mutex::new(Vec::new()),
        }
    }
}

impl MockAuditTrail {
    /// A trail with no events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event. It is indexed under its `event_name`.
    pub fn with_event(mut self, event: AuditEvent) -> Self {
        let name = event.event_name.clone().unwrap_or_default();
        self.events.entry(name).or_default().push(event);
        self
    }

    /// Serve at most `page_size` events per page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Fail every lookup with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Every query received so far, one entry per page request.
    pub fn queries(&self) -> Vec<EventQuery> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl AuditTrail for MockAuditTrail {
    async fn lookup_events_page(
        &self,
        query: &EventQuery,
        next_token: Option<String>,
    ) -> Result<Page<AuditEvent>, ProviderError> {
        lock(&self.queries).push(query.clone());
        if let Some(message) = &self.failure {
            return Err(ProviderError::Api {
                operation: "LookupEvents",
                message: message.clone(),
            });
        }

        let matching: Vec<AuditEvent> = self
            .events
            .get(&query.event_name)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| e.event_time.map_or(true, |t| query.window.contains(t)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let pages: Vec<Vec<AuditEvent>> = matching
            .chunks(self.page_size)
            .map(<[AuditEvent]>::to_vec)
            .collect();
        serve_page(&pages, "events", next_token.as_deref(), "LookupEvents")
    }

    fn trail_name(&self) -> &str {
        "MockAuditTrail"
    }
}

fn request_parameters(kind: EntityKind, name: &str) -> serde_json::Value {
    let mut params = serde_json::Map::new();
    params.insert(kind.request_parameter().to_string(), name.into());
    serde_json::Value::Object(params)
}

/// A successful deletion event for `name`, shaped like a real CloudTrail record.
pub fn deletion_event(kind: EntityKind, name: &str, at: DateTime<Utc>) -> AuditEvent {
    let payload = serde_json::json!({
        "eventVersion": "1.08",
        "eventSource": "iam.amazonaws.com",
        "eventName": kind.delete_event_name(),
        "eventTime": at.to_rfc3339(),
        "requestParameters": request_parameters(kind, name),
        "responseElements": null
    });
    AuditEvent {
        event_id: Some(format!("{}-{name}-{}", kind.delete_event_name(), at.timestamp())),
        event_name: Some(kind.delete_event_name().to_string()),
        event_time: Some(at),
        payload: Some(payload.to_string()),
    }
}

/// A deletion event whose call failed with `error_code`.
pub fn failed_deletion_event(
    kind: EntityKind,
    name: &str,
    error_code: &str,
    at: DateTime<Utc>,
) -> AuditEvent {
    let payload = serde_json::json!({
        "eventName": kind.delete_event_name(),
        "errorCode": error_code,
        "requestParameters": request_parameters(kind, name)
    });
    AuditEvent {
        event_id: Some(format!("failed-{name}-{}", at.timestamp())),
        event_name: Some(kind.delete_event_name().to_string()),
        event_time: Some(at),
        payload: Some(payload.to_string()),
    }
}

/// A deletion call rejected before IAM resolved its parameters; CloudTrail
/// records it with `"requestParameters": null`.
pub fn rejected_deletion_event(
    kind: EntityKind,
    error_code: &str,
    at: DateTime<Utc>,
) -> AuditEvent {
    let payload = serde_json::json!({
        "eventName": kind.delete_event_name(),
        "errorCode": error_code,
        "errorMessage": format!("User is not authorized to perform: iam:{}", kind.delete_event_name()),
        "requestParameters": null
    });
    AuditEvent {
        event_id: Some(format!("rejected-{}", at.timestamp())),
        event_name: Some(kind.delete_event_name().to_string()),
        event_time: Some(at),
        payload: Some(payload.to_string()),
    }
}
