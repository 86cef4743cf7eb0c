//! The storage facade.
//!
//! [`FileStorage`] is the single entry point callers use. It owns a remote
//! client scoped to one bucket and applies a uniform error policy:
//!
//! - reads of absent objects return `None` / `false`, never an error
//! - mutating operations report remote failure as `Ok(false)` after logging,
//!   so a flaky remote degrades instead of propagating
//! - listing operations propagate remote errors
//! - cancellation is always `Err(Error::Cancelled)`, distinct from failure

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{RemoteConfig, StorageOptions};
use crate::deleter;
use crate::lister::{list_matching, FileSpec};
use crate::page::{fetch_page, Page, PageState};
use crate::path;
use crate::pattern::SearchCriteria;
use crate::remote::{create_remote, ByteChunks, RemoteClient};
use crate::stage::{stage, SaveSource};
use crate::{Error, Result};

/// Bucket-scoped facade over a remote object store.
pub struct FileStorage {
    remote: Arc<dyn RemoteClient>,
    options: StorageOptions,
    bucket_confirmed: AtomicBool,
}

impl FileStorage {
    /// Wrap an existing remote client.
    pub fn new(remote: Arc<dyn RemoteClient>, options: StorageOptions) -> Self {
        Self {
            remote,
            options,
            bucket_confirmed: AtomicBool::new(false),
        }
    }

    /// Build the remote described by `config` and wrap it.
    pub fn open(config: &RemoteConfig) -> Result<Self> {
        let remote = create_remote(config)?;
        Ok(Self::new(remote, StorageOptions::new(config.bucket())))
    }

    /// The bucket every operation addresses.
    pub fn bucket(&self) -> &str {
        &self.options.bucket
    }

    /// Provision the bucket on first use.
    ///
    /// The confirmed flag is sticky: once the bucket has been seen or
    /// created, later calls return without touching the remote.
    async fn ensure_bucket(&self) -> Result<()> {
        if !self.options.auto_create_bucket {
            return Ok(());
        }
        if self.bucket_confirmed.load(Ordering::Acquire) {
            return Ok(());
        }
        let bucket = &self.options.bucket;
        if !self.remote.bucket_exists(bucket).await? {
            info!(bucket = %bucket, "creating bucket");
            self.remote.create_bucket(bucket).await?;
        }
        self.bucket_confirmed.store(true, Ordering::Release);
        Ok(())
    }

    /// Open a streaming read of an object, or `None` when it does not exist.
    pub async fn get_stream(
        &self,
        file_path: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<ByteChunks>> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.ensure_bucket().await?;
        let key = path::normalize(file_path);
        match self.remote.get_object(self.bucket(), &key).await {
            Ok(chunks) => Ok(Some(chunks)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Read an object fully into memory, or `None` when it does not exist.
    pub async fn get(&self, file_path: &str, cancel: &CancellationToken) -> Result<Option<Bytes>> {
        let Some(mut chunks) = self.get_stream(file_path, cancel).await? else {
            return Ok(None);
        };
        let mut data = BytesMut::new();
        while let Some(chunk) = chunks.next().await {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            data.extend_from_slice(&chunk?);
        }
        Ok(Some(data.freeze()))
    }

    /// Fetch an object's descriptor, or `None` when it does not exist.
    pub async fn get_info(
        &self,
        file_path: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<FileSpec>> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.ensure_bucket().await?;
        let key = path::normalize(file_path);
        match self.remote.stat_object(self.bucket(), &key).await {
            Ok(stat) => Ok(Some(FileSpec {
                path: key.into_owned(),
                size: stat.size,
                created: stat.last_modified,
                modified: stat.last_modified,
            })),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Whether an object exists.
    pub async fn exists(&self, file_path: &str, cancel: &CancellationToken) -> Result<bool> {
        Ok(self.get_info(file_path, cancel).await?.is_some())
    }

    /// Write an object from a save source.
    ///
    /// Returns `true` on success and `false` when staging or the remote
    /// write failed; the failure is logged. Cancellation is an error, not a
    /// `false`.
    pub async fn save(
        &self,
        file_path: &str,
        source: SaveSource,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.ensure_bucket().await?;
        let key = path::normalize(file_path);

        let data = match stage(source, cancel).await {
            Ok(data) => data,
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(e) => {
                warn!(path = %key, error = %e, "failed to stage save input");
                return Ok(false);
            }
        };

        match self.remote.put_object(self.bucket(), &key, data).await {
            Ok(()) => {
                debug!(path = %key, "saved object");
                Ok(true)
            }
            Err(e) => {
                warn!(path = %key, error = %e, "failed to save object");
                Ok(false)
            }
        }
    }

    /// Server-side copy. Returns `false` (logged) when the remote copy fails,
    /// including when the source does not exist.
    pub async fn copy(
        &self,
        src_path: &str,
        dst_path: &str,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.ensure_bucket().await?;
        let src = path::normalize(src_path);
        let dst = path::normalize(dst_path);
        match self.remote.copy_object(self.bucket(), &src, &dst).await {
            Ok(()) => {
                debug!(src = %src, dst = %dst, "copied object");
                Ok(true)
            }
            Err(e) => {
                warn!(src = %src, dst = %dst, error = %e, "failed to copy object");
                Ok(false)
            }
        }
    }

    /// Copy then delete the source. Not atomic: when the copy succeeds but
    /// the source deletion fails, the object exists under both keys and the
    /// call returns `false`.
    pub async fn rename(
        &self,
        src_path: &str,
        dst_path: &str,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        if !self.copy(src_path, dst_path, cancel).await? {
            return Ok(false);
        }
        let src = path::normalize(src_path);
        match self.remote.remove_object(self.bucket(), &src).await {
            Ok(()) => {
                debug!(src = %src, dst = %path::normalize(dst_path), "renamed object");
                Ok(true)
            }
            Err(e) => {
                warn!(src = %src, error = %e, "copied but failed to delete source");
                Ok(false)
            }
        }
    }

    /// Delete a single object. Deleting an absent object succeeds.
    pub async fn delete(&self, file_path: &str, cancel: &CancellationToken) -> Result<bool> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.ensure_bucket().await?;
        let key = path::normalize(file_path);
        match self.remote.remove_object(self.bucket(), &key).await {
            Ok(()) => {
                debug!(path = %key, "deleted object");
                Ok(true)
            }
            Err(e) => {
                warn!(path = %key, error = %e, "failed to delete object");
                Ok(false)
            }
        }
    }

    /// List every object matching `pattern` (all objects when `None`).
    pub async fn list(
        &self,
        pattern: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<FileSpec>> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.ensure_bucket().await?;
        let criteria = SearchCriteria::compile(pattern);
        let mut specs = Vec::new();
        {
            let mut entries = list_matching(self.remote.as_ref(), self.bucket(), &criteria, cancel);
            while let Some(entry) = entries.next().await {
                specs.push(entry?);
            }
        }
        Ok(specs)
    }

    /// Fetch the first page of a paged listing.
    pub async fn paged_list(
        &self,
        pattern: Option<&str>,
        page_size: usize,
        cancel: &CancellationToken,
    ) -> Result<Page> {
        if page_size == 0 {
            return Err(Error::Config("page size must be positive".to_string()));
        }
        self.ensure_bucket().await?;
        let criteria = SearchCriteria::compile(pattern);
        fetch_page(
            self.remote.as_ref(),
            self.bucket(),
            criteria,
            page_size,
            1,
            cancel,
        )
        .await
    }

    /// Fetch the page a previous listing's cursor points at.
    pub async fn next_page(&self, state: &PageState, cancel: &CancellationToken) -> Result<Page> {
        self.ensure_bucket().await?;
        fetch_page(
            self.remote.as_ref(),
            self.bucket(),
            state.criteria.clone(),
            state.page_size,
            state.next_page,
            cancel,
        )
        .await
    }

    /// Delete every object matching `pattern`, returning how many were
    /// actually removed.
    pub async fn delete_matching(
        &self,
        pattern: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<u64> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.ensure_bucket().await?;
        let criteria = SearchCriteria::compile(pattern);
        let deleted =
            deleter::delete_matching(self.remote.as_ref(), self.bucket(), criteria, cancel).await?;
        info!(bucket = %self.bucket(), deleted, pattern = ?pattern, "bulk delete finished");
        Ok(deleted)
    }
}
