//! Filtered object enumeration.
//!
//! Wraps the raw remote enumeration with criteria filtering, directory-marker
//! suppression, and the missing-container degrade: a listing of a bucket that
//! does not exist yields an empty stream, not an error.

use async_stream::stream;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::pattern::SearchCriteria;
use crate::remote::{RawObjectEntry, RemoteClient};
use crate::{Error, Result};

/// Descriptor for one stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSpec {
    /// Normalized object key
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// Creation timestamp
    pub created: DateTime<Utc>,
    /// Last modified timestamp
    pub modified: DateTime<Utc>,
}

impl FileSpec {
    fn from_entry(entry: RawObjectEntry) -> Self {
        // providers report a single timestamp; creation is not tracked
        // separately
        let modified = entry.last_modified.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        Self {
            path: entry.key,
            size: entry.size,
            created: modified,
            modified,
        }
    }
}

/// Enumerate objects matching `criteria`, in provider iteration order.
pub(crate) fn list_matching<'a>(
    remote: &'a dyn RemoteClient,
    bucket: &'a str,
    criteria: &'a SearchCriteria,
    cancel: &'a CancellationToken,
) -> BoxStream<'a, Result<FileSpec>> {
    Box::pin(stream! {
        debug!(bucket = %bucket, prefix = %criteria.prefix, "listing objects");
        let mut entries = remote.list_objects(bucket, &criteria.prefix, true);
        while let Some(entry) = entries.next().await {
            if cancel.is_cancelled() {
                yield Err(Error::Cancelled);
                return;
            }
            match entry {
                Ok(entry) => {
                    if entry.is_dir_marker || !criteria.accepts(&entry.key) {
                        continue;
                    }
                    yield Ok(FileSpec::from_entry(entry));
                }
                // a bucket that was never created holds no objects
                Err(e) if e.is_not_found() => return,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }
    })
}
