//! Remote object-store collaborator interface and implementations.
//!
//! The core consumes the remote store through this narrow trait and never
//! reimplements remote-protocol mechanics. Two implementations ship with the
//! crate:
//!
//! - [`ObjectStoreRemote`]: adapter over the `object_store` crate (AWS S3,
//!   Azure Blob Storage, Google Cloud Storage)
//! - [`MemoryRemote`]: in-memory remote for testing, with failure injection

mod memory;
mod provider;

pub use memory::MemoryRemote;
pub use provider::ObjectStoreRemote;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;

use crate::config::RemoteConfig;
use crate::Result;

/// Streaming object body: a sequence of byte chunks.
pub type ByteChunks = BoxStream<'static, Result<Bytes>>;

/// Metadata snapshot for a single remote object.
#[derive(Debug, Clone)]
pub struct ObjectStat {
    /// Size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub last_modified: DateTime<Utc>,
}

/// One record of the raw remote enumeration, before any filtering.
#[derive(Debug, Clone)]
pub struct RawObjectEntry {
    /// Object key
    pub key: String,
    /// True for directory-marker entries; only concrete objects carry data
    pub is_dir_marker: bool,
    /// Size in bytes
    pub size: u64,
    /// Last modified timestamp, when the provider reports one
    pub last_modified: Option<DateTime<Utc>>,
}

/// A deletion the remote store reported as failed within a batch removal.
#[derive(Debug, Clone)]
pub struct RemoveFailure {
    /// Object key that could not be removed
    pub key: String,
    /// Provider error message
    pub message: String,
}

/// Narrow interface to the remote bucket-oriented object store.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Check whether a bucket exists.
    async fn bucket_exists(&self, bucket: &str) -> Result<bool>;

    /// Create a bucket. Duplicate creation must be a benign no-op.
    async fn create_bucket(&self, bucket: &str) -> Result<()>;

    /// Stat a single object. Fails with [`crate::Error::NotFound`] when absent.
    async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectStat>;

    /// Open a streaming read of an object's bytes.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<ByteChunks>;

    /// Write an object.
    async fn put_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<()>;

    /// Server-side copy within the bucket.
    async fn copy_object(&self, bucket: &str, src_key: &str, dst_key: &str) -> Result<()>;

    /// Remove a single object. Removing an absent key is not an error.
    async fn remove_object(&self, bucket: &str, key: &str) -> Result<()>;

    /// Remove a batch of objects, returning only the deletions the remote
    /// store reported as failed.
    async fn remove_objects(&self, bucket: &str, keys: &[String]) -> Result<Vec<RemoveFailure>>;

    /// Lazily enumerate raw entries under a prefix, in provider iteration
    /// order. The stream is forward-only and single-pass; a fresh call
    /// re-issues a fresh remote enumeration.
    fn list_objects<'a>(
        &'a self,
        bucket: &'a str,
        prefix: &'a str,
        recursive: bool,
    ) -> BoxStream<'a, Result<RawObjectEntry>>;
}

/// Create a remote client from configuration.
pub fn create_remote(config: &RemoteConfig) -> Result<Arc<dyn RemoteClient>> {
    match config {
        RemoteConfig::Memory => Ok(Arc::new(MemoryRemote::new())),
        _ => Ok(Arc::new(ObjectStoreRemote::from_config(config)?)),
    }
}
