//! Batched deletion of objects matching search criteria.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::page::{fetch_page, PageCursor};
use crate::pattern::SearchCriteria;
use crate::remote::RemoteClient;
use crate::Result;

/// Objects are deleted in pages of this size.
pub(crate) const DELETE_PAGE_SIZE: usize = 250;

/// Delete every object matching `criteria`, one page at a time.
///
/// Failed deletions are logged and subtracted from the returned count; the
/// sweep continues through the remaining pages.
pub(crate) async fn delete_matching(
    remote: &dyn RemoteClient,
    bucket: &str,
    criteria: SearchCriteria,
    cancel: &CancellationToken,
) -> Result<u64> {
    let mut deleted: u64 = 0;
    let mut page_number = 1usize;
    let mut current = criteria;
    loop {
        let page = fetch_page(
            remote,
            bucket,
            current.clone(),
            DELETE_PAGE_SIZE,
            page_number,
            cancel,
        )
        .await?;
        if page.items.is_empty() {
            break;
        }

        let keys: Vec<String> = page.items.into_iter().map(|spec| spec.path).collect();
        let batch = keys.len();
        let failures = remote.remove_objects(bucket, &keys).await?;
        for failure in &failures {
            warn!(key = %failure.key, error = %failure.message, "failed to delete object");
        }
        deleted += (batch - failures.len()) as u64;
        debug!(page = page_number, batch, failed = failures.len(), "deleted page");

        match page.cursor {
            PageCursor::More(state) => {
                current = state.criteria;
                page_number = state.next_page;
            }
            PageCursor::Exhausted => break,
        }
    }
    Ok(deleted)
}
