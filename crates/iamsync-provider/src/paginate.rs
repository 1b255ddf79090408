//! Continuation-marker pagination.
//!
//! IAM (`Marker`) and CloudTrail (`NextToken`) paginate the same way: each
//! call returns some items and, if more remain, an opaque token to pass to
//! the next call. [`collect_pages`] drives that loop to completion.

use std::collections::HashSet;
use std::future::Future;

use tracing::debug;

use crate::error::ProviderError;

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Continuation marker. `None` on the last page.
    pub next: Option<String>,
}

impl<T> Page<T> {
    /// A page with a continuation marker; an empty marker counts as none.
    pub fn new(items: Vec<T>, next: Option<String>) -> Self {
        Self {
            items,
            next: next.filter(|m| !m.is_empty()),
        }
    }

    /// The final page of a listing.
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }
}

/// Fetch every page of a listing and return all items in page order.
///
/// `fetch` is called first with `None`, then with each returned marker until
/// a page comes back without one. Any error aborts the loop and drops the
/// items gathered so far.
///
/// # Errors
///
/// Propagates the first error from `fetch`, or
/// [`ProviderError::PaginationStalled`] if a page returns a marker that was
/// already followed, which would otherwise loop forever.
pub async fn collect_pages<T, F, Fut>(
    operation: &'static str,
    mut fetch: F,
) -> Result<Vec<T>, ProviderError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, ProviderError>>,
{
    let mut all = Vec::new();
    let mut marker: Option<String> = None;
    let mut seen = HashSet::new();
    let mut pages = 0usize;

    loop {
        let page = fetch(marker.clone()).await?;
        pages += 1;
        debug!(operation, page = pages, items = page.items.len(), "fetched page");
        all.extend(page.items);

        match page.next {
            None => break,
            Some(next) if !seen.insert(next.clone()) => {
                return Err(ProviderError::PaginationStalled {
                    operation,
                    marker: next,
                });
            }
            Some(next) => marker = Some(next),
        }
    }

    debug!(operation, pages, total = all.len(), "pagination complete");
    Ok(all)
}
