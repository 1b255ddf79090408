//! # CloudTrail Deletion Events
//!
//! `LookupEvents` returns a summary per event plus the full event record as a
//! JSON string (`CloudTrailEvent`). The deletion sweep only needs one field
//! of that record, `requestParameters.userName` or
//! `requestParameters.groupName`, and whether the call failed.
//!
//! CloudTrail also records calls that were rejected (`DeleteConflict`,
//! `AccessDenied`, ...). Those carry an `errorCode` and deleted nothing, so
//! they are reported as [`DeletionSignal::Failed`] rather than as deletions.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::PayloadError;
use crate::kind::EntityKind;

/// One event returned by an audit-log lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub event_id: Option<String>,
    pub event_name: Option<String>,
    pub event_time: Option<DateTime<Utc>>,
    /// Raw `CloudTrailEvent` JSON document.
    pub payload: Option<String>,
}

/// What a deletion event says about the entity it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionSignal {
    /// The entity with this display name was deleted.
    Deleted(String),
    /// A delete call was recorded but failed. Rejected calls often carry
    /// `"requestParameters": null`, so the name may be unknown.
    Failed {
        name: Option<String>,
        error_code: String,
    },
}

/// The subset of a CloudTrail record the sweep reads.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrailRecord {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    request_parameters: Option<serde_json::Map<String, serde_json::Value>>,
}

impl AuditEvent {
    fn id_for_errors(&self) -> String {
        self.event_id
            .clone()
            .unwrap_or_else(|| "<unknown>".to_string())
    }

    /// Extract the deleted entity's display name for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError`] if the payload is absent or is not a JSON
    /// object, or if a successful call lacks a non-empty
    /// `requestParameters.<name field>`. Failed calls never need the name.
    pub fn deletion_signal(&self, kind: EntityKind) -> Result<DeletionSignal, PayloadError> {
        let payload = self.payload.as_deref().ok_or_else(|| PayloadError::Missing {
            event_id: self.id_for_errors(),
        })?;

        let record: TrailRecord =
            serde_json::from_str(payload).map_err(|source| PayloadError::Malformed {
                event_id: self.id_for_errors(),
                source,
            })?;

        let field = kind.request_parameter();
        let name = record
            .request_parameters
            .as_ref()
            .and_then(|params| params.get(field))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        if let Some(error_code) = record.error_code.filter(|code| !code.is_empty()) {
            return Ok(DeletionSignal::Failed { name, error_code });
        }

        name.map(DeletionSignal::Deleted)
            .ok_or_else(|| PayloadError::MissingField {
                event_id: self.id_for_errors(),
                field,
            })
    }
}
