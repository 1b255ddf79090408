//! Paginated IAM entity listing.

use async_trait::async_trait;
use iamsync_core::{IamGroup, IamUser};

use crate::error::ProviderError;
use crate::paginate::{collect_pages, Page};

/// Source of the current user and group inventory.
///
/// Implementations must be `Send + Sync` so a reconciler holding one can be
/// driven from any Tokio worker.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Fetch one page of users, starting after `marker`.
    async fn list_users_page(&self, marker: Option<String>)
        -> Result<Page<IamUser>, ProviderError>;

    /// Fetch one page of groups, starting after `marker`.
    async fn list_groups_page(
        &self,
        marker: Option<String>,
    ) -> Result<Page<IamGroup>, ProviderError>;

    /// Human-readable name of this implementation, for logs.
    fn directory_name(&self) -> &str;
}

/// Every user in the directory, across all pages.
pub async fn list_all_users<D: Directory + ?Sized>(
    directory: &D,
) -> Result<Vec<IamUser>, ProviderError> {
    collect_pages("ListUsers", |marker| directory.list_users_page(marker)).await
}

/// Every group in the directory, across all pages.
pub async fn list_all_groups<D: Directory + ?Sized>(
    directory: &D,
) -> Result<Vec<IamGroup>, ProviderError> {
    collect_pages("ListGroups", |marker| directory.list_groups_page(marker)).await
}
