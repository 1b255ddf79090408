//! # Payload Errors
//!
//! A CloudTrail event is only useful to the deletion sweep if its JSON
//! payload names the deleted entity. Any event that does not is reported
//! here and aborts the run.

use thiserror::Error;

/// Failure to extract a deleted entity's name from a CloudTrail event.
#[derive(Error, Debug)]
pub enum PayloadError {
    /// The event carried no `CloudTrailEvent` document.
    #[error("event {event_id} has no CloudTrail payload")]
    Missing {
        /// CloudTrail event ID, or `<unknown>`.
        event_id: String,
    },

    /// The payload is not a JSON object of the expected shape.
    #[error("event {event_id} payload is malformed: {source}")]
    Malformed {
        event_id: String,
        #[source]
        source: serde_json::Error,
    },

    /// The payload has no non-empty `requestParameters.<field>`.
    #[error("event {event_id} payload has no requestParameters.{field}")]
    MissingField {
        event_id: String,
        /// The request parameter that was expected (`userName` or `groupName`).
        field: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_event_and_field() {
        let err = PayloadError::MissingField {
            event_id: "ev-1".into(),
            field: "userName",
        };
        assert_eq!(
            err.to_string(),
            "event ev-1 payload has no requestParameters.userName"
        );

        let err = PayloadError::Missing {
            event_id: "ev-2".into(),
        };
        assert!(err.to_string().contains("ev-2"));
    }
}
