//! # AWS Implementations
//!
//! [`IamDirectory`] wraps `aws_sdk_iam::Client` (`ListUsers`, `ListGroups`)
//! and [`CloudTrailAuditTrail`] wraps `aws_sdk_cloudtrail::Client`
//! (`LookupEvents`). Both are built from one shared `SdkConfig` loaded by
//! [`AwsProvider::load`], so credentials are resolved once per run.
//!
//! SDK timestamps are converted to `chrono::DateTime<Utc>` at this boundary;
//! nothing past this module sees an SDK type.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::timeout::TimeoutConfig;
use aws_config::BehaviorVersion;
use aws_sdk_cloudtrail::types::{LookupAttribute, LookupAttributeKey};
use chrono::{DateTime, Utc};
use iamsync_core::{AuditEvent, IamGroup, IamUser};
use tracing::info;

use crate::audit::{AuditTrail, EventQuery};
use crate::config::ProviderConfig;
use crate::directory::Directory;
use crate::error::ProviderError;
use crate::paginate::Page;

/// SDK timestamp type shared by the IAM and CloudTrail clients.
type SdkDateTime = aws_sdk_iam::primitives::DateTime;

/// Both AWS collaborators, built from one SDK configuration.
#[derive(Debug, Clone)]
pub struct AwsProvider {
    directory: IamDirectory,
    audit_trail: CloudTrailAuditTrail,
}

impl AwsProvider {
    /// Resolve region and credentials from the ambient chain and build clients.
    ///
    /// Credentials are resolved lazily by the SDK; a missing or invalid
    /// credential surfaces as a [`ProviderError::Api`] on the first call.
    pub async fn load(config: &ProviderConfig) -> Self {
        let timeouts = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(config.timeout_secs))
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).timeout_config(timeouts);
        if let Some(region) = &config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        info!(
            region = sdk_config.region().map(|r| r.as_ref()).unwrap_or("<unset>"),
            timeout_secs = config.timeout_secs,
            "AWS clients configured"
        );

        Self {
            directory: IamDirectory::new(aws_sdk_iam::Client::new(&sdk_config)),
            audit_trail: CloudTrailAuditTrail::new(aws_sdk_cloudtrail::Client::new(&sdk_config)),
        }
    }

    /// Split into the directory and audit-trail halves.
    pub fn into_parts(self) -> (IamDirectory, CloudTrailAuditTrail) {
        (self.directory, self.audit_trail)
    }
}

// -- IAM ---------------------------------------------------------------------

/// IAM `ListUsers` / `ListGroups` over the AWS SDK.
#[derive(Debug, Clone)]
pub struct IamDirectory {
    client: aws_sdk_iam::Client,
}

impl IamDirectory {
    pub fn new(client: aws_sdk_iam::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Directory for IamDirectory {
    async fn list_users_page(
        &self,
        marker: Option<String>,
    ) -> Result<Page<IamUser>, ProviderError> {
        let operation = "ListUsers";
        let out = self
            .client
            .list_users()
            .set_marker(marker)
            .send()
            .await
            .map_err(|e| ProviderError::Api {
                operation,
                message: aws_sdk_iam::error::DisplayErrorContext(&e).to_string(),
            })?;

        let users = out
            .users()
            .iter()
            .map(|u| {
                Ok(IamUser {
                    user_id: u.user_id().to_string(),
                    user_name: u.user_name().to_string(),
                    arn: u.arn().to_string(),
                    create_date: to_utc(u.create_date(), operation)?,
                    password_last_used: u
                        .password_last_used()
                        .map(|t| to_utc(t, operation))
                        .transpose()?,
                })
            })
            .collect::<Result<Vec<_>, ProviderError>>()?;

        let next = if out.is_truncated() {
            Some(out.marker().map(str::to_string).ok_or(ProviderError::MissingField {
                operation,
                field: "Marker",
            })?)
        } else {
            None
        };

        Ok(Page::new(users, next))
    }

    async fn list_groups_page(
        &self,
        marker: Option<String>,
    ) -> Result<Page<IamGroup>, ProviderError> {
        let operation = "ListGroups";
        let out = self
            .client
            .list_groups()
            .set_marker(marker)
            .send()
            .await
            .map_err(|e| ProviderError::Api {
                operation,
                message: aws_sdk_iam::error::DisplayErrorContext(&e).to_string(),
            })?;

        let groups = out
            .groups()
            .iter()
            .map(|g| {
                Ok(IamGroup {
                    group_id: g.group_id().to_string(),
                    group_name: g.group_name().to_string(),
                    arn: g.arn().to_string(),
                    create_date: to_utc(g.create_date(), operation)?,
                })
            })
            .collect::<Result<Vec<_>, ProviderError>>()?;

        let next = if out.is_truncated() {
            Some(out.marker().map(str::to_string).ok_or(ProviderError::MissingField {
                operation,
                field: "Marker",
            })?)
        } else {
            None
        };

        Ok(Page::new(groups, next))
    }

    fn directory_name(&self) -> &str {
        "aws-iam"
    }
}

// -- CloudTrail --------------------------------------------------------------

/// CloudTrail `LookupEvents` over the AWS SDK.
#[derive(Debug, Clone)]
pub struct CloudTrailAuditTrail {
    client: aws_sdk_cloudtrail::Client,
}

impl CloudTrailAuditTrail {
    pub fn new(client: aws_sdk_cloudtrail::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuditTrail for CloudTrailAuditTrail {
    async fn lookup_events_page(
        &self,
        query: &EventQuery,
        next_token: Option<String>,
    ) -> Result<Page<AuditEvent>, ProviderError> {
        let operation = "LookupEvents";
        let attribute = LookupAttribute::builder()
            .attribute_key(LookupAttributeKey::EventName)
            .attribute_value(query.event_name.clone())
            .build()
            .map_err(|e| ProviderError::InvalidRequest {
                operation,
                message: e.to_string(),
            })?;

        let out = self
            .client
            .lookup_events()
            .lookup_attributes(attribute)
            .start_time(to_sdk(query.window.start))
            .end_time(to_sdk(query.window.end))
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| ProviderError::Api {
                operation,
                message: aws_sdk_cloudtrail::error::DisplayErrorContext(&e).to_string(),
            })?;

        let events = out
            .events()
            .iter()
            .map(|e| {
                Ok(AuditEvent {
                    event_id: e.event_id().map(str::to_string),
                    event_name: e.event_name().map(str::to_string),
                    event_time: e.event_time().map(|t| to_utc(t, operation)).transpose()?,
                    payload: e.cloud_trail_event().map(str::to_string),
                })
            })
            .collect::<Result<Vec<_>, ProviderError>>()?;

        Ok(Page::new(events, out.next_token().map(str::to_string)))
    }

    fn trail_name(&self) -> &str {
        "aws-cloudtrail"
    }
}

// -- Timestamp conversion ----------------------------------------------------

fn to_utc(t: &SdkDateTime, operation: &'static str) -> Result<DateTime<Utc>, ProviderError> {
    DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos()).ok_or(
        ProviderError::MissingField {
            operation,
            field: "a representable timestamp",
        },
    )
}

fn to_sdk(t: DateTime<Utc>) -> SdkDateTime {
    SdkDateTime::from_secs_and_nanos(t.timestamp(), t.timestamp_subsec_nanos())
}
