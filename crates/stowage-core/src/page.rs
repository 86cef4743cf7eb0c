//! Skip/limit paging over filtered listings.
//!
//! Each page re-enumerates the remote from the start of the criteria prefix,
//! skips the items already served, and over-fetches one item past the page
//! size to learn whether a further page exists without a second enumeration.

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::lister::{list_matching, FileSpec};
use crate::pattern::SearchCriteria;
use crate::remote::RemoteClient;
use crate::{Error, Result};

/// State required to fetch the next page of a paged listing.
#[derive(Debug, Clone)]
pub struct PageState {
    pub(crate) criteria: SearchCriteria,
    pub(crate) page_size: usize,
    pub(crate) next_page: usize,
}

/// Continuation of a paged listing.
#[derive(Debug, Clone)]
pub enum PageCursor {
    /// The listing is complete.
    Exhausted,
    /// More items remain; pass the state back to fetch them.
    More(PageState),
}

/// One page of a paged listing.
#[derive(Debug)]
pub struct Page {
    /// Items on this page, in enumeration order
    pub items: Vec<FileSpec>,
    /// Continuation for the following page
    pub cursor: PageCursor,
}

impl Page {
    pub fn has_more(&self) -> bool {
        matches!(self.cursor, PageCursor::More(_))
    }
}

/// Fetch page `page_number` (1-indexed) of the listing.
pub(crate) async fn fetch_page(
    remote: &dyn RemoteClient,
    bucket: &str,
    criteria: SearchCriteria,
    page_size: usize,
    page_number: usize,
    cancel: &CancellationToken,
) -> Result<Page> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    let skip = (page_number - 1) * page_size;
    let limit = page_size + 1;
    debug!(bucket = %bucket, page = page_number, skip, "fetching page");

    let mut items = Vec::with_capacity(limit);
    {
        let mut entries = list_matching(remote, bucket, &criteria, cancel)
            .skip(skip)
            .take(limit);
        while let Some(entry) = entries.next().await {
            items.push(entry?);
        }
    }

    let cursor = if items.len() == limit {
        // the extra item proves another page exists and is never served
        items.pop();
        PageCursor::More(PageState {
            criteria,
            page_size,
            next_page: page_number + 1,
        })
    } else {
        PageCursor::Exhausted
    };
    Ok(Page { items, cursor })
}
