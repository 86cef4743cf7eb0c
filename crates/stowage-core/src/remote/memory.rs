//! In-memory remote for unit and integration tests.
//!
//! Keys live in a `BTreeMap`, so enumeration order is lexicographic like the
//! listings real providers return. Failure injection lets tests exercise the
//! partial-failure paths of the facade without a real remote.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream};
use tracing::debug;

use super::{ByteChunks, ObjectStat, RawObjectEntry, RemoteClient, RemoveFailure};
use crate::{Error, Result};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    last_modified: DateTime<Utc>,
}

/// In-memory bucket-oriented remote.
#[derive(Default)]
pub struct MemoryRemote {
    buckets: Mutex<HashMap<String, BTreeMap<String, StoredObject>>>,
    fail_puts: Mutex<HashSet<String>>,
    fail_removals: Mutex<HashSet<String>>,
    create_bucket_calls: AtomicUsize,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next and every subsequent put of `key` fail.
    pub fn inject_put_failure(&self, key: impl Into<String>) {
        self.fail_puts.lock().unwrap().insert(key.into());
    }

    /// Make every removal of `key` fail.
    pub fn inject_removal_failure(&self, key: impl Into<String>) {
        self.fail_removals.lock().unwrap().insert(key.into());
    }

    /// How many times `create_bucket` has been called.
    pub fn create_bucket_call_count(&self) -> usize {
        self.create_bucket_calls.load(Ordering::SeqCst)
    }

    /// Number of objects currently stored in `bucket`.
    pub fn object_count(&self, bucket: &str) -> usize {
        self.buckets
            .lock()
            .unwrap()
            .get(bucket)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl RemoteClient for MemoryRemote {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        Ok(self.buckets.lock().unwrap().contains_key(bucket))
    }

    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        self.create_bucket_calls.fetch_add(1, Ordering::SeqCst);
        self.buckets
            .lock()
            .unwrap()
            .entry(bucket.to_string())
            .or_default();
        debug!(bucket = %bucket, "created in-memory bucket");
        Ok(())
    }

    async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectStat> {
        let buckets = self.buckets.lock().unwrap();
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| Error::NotFound(bucket.to_string()))?;
        let object = objects
            .get(key)
            .ok_or_else(|| Error::NotFound(key.to_string()))?;
        Ok(ObjectStat {
            size: object.data.len() as u64,
            last_modified: object.last_modified,
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ByteChunks> {
        let buckets = self.buckets.lock().unwrap();
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| Error::NotFound(bucket.to_string()))?;
        let object = objects
            .get(key)
            .ok_or_else(|| Error::NotFound(key.to_string()))?;
        let data = object.data.clone();
        Ok(Box::pin(stream::once(async move { Ok(data) })))
    }

    async fn put_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<()> {
        if self.fail_puts.lock().unwrap().contains(key) {
            return Err(Error::Backend(format!("injected put failure for {}", key)));
        }
        let mut buckets = self.buckets.lock().unwrap();
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| Error::NotFound(bucket.to_string()))?;
        objects.insert(
            key.to_string(),
            StoredObject {
                data,
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn copy_object(&self, bucket: &str, src_key: &str, dst_key: &str) -> Result<()> {
        let mut buckets = self.buckets.lock().unwrap();
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| Error::NotFound(bucket.to_string()))?;
        let source = objects
            .get(src_key)
            .ok_or_else(|| Error::NotFound(src_key.to_string()))?
            .clone();
        objects.insert(
            dst_key.to_string(),
            StoredObject {
                data: source.data,
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn remove_object(&self, bucket: &str, key: &str) -> Result<()> {
        if self.fail_removals.lock().unwrap().contains(key) {
            return Err(Error::Backend(format!(
                "injected removal failure for {}",
                key
            )));
        }
        let mut buckets = self.buckets.lock().unwrap();
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| Error::NotFound(bucket.to_string()))?;
        objects.remove(key);
        Ok(())
    }

    async fn remove_objects(&self, bucket: &str, keys: &[String]) -> Result<Vec<RemoveFailure>> {
        let mut failures = Vec::new();
        let failing = self.fail_removals.lock().unwrap().clone();
        let mut buckets = self.buckets.lock().unwrap();
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| Error::NotFound(bucket.to_string()))?;
        for key in keys {
            if failing.contains(key) {
                failures.push(RemoveFailure {
                    key: key.clone(),
                    message: "injected removal failure".to_string(),
                });
            } else {
                objects.remove(key);
            }
        }
        Ok(failures)
    }

    fn list_objects<'a>(
        &'a self,
        bucket: &'a str,
        prefix: &'a str,
        recursive: bool,
    ) -> BoxStream<'a, Result<RawObjectEntry>> {
        let entries: Vec<Result<RawObjectEntry>> = {
            let buckets = self.buckets.lock().unwrap();
            match buckets.get(bucket) {
                None => vec![Err(Error::NotFound(bucket.to_string()))],
                Some(objects) => objects
                    .iter()
                    .filter(|(key, _)| key.starts_with(prefix))
                    .filter(|(key, _)| {
                        // without recursion, hide keys in deeper segments
                        recursive || !key[prefix.len()..].trim_end_matches('/').contains('/')
                    })
                    .map(|(key, object)| {
                        Ok(RawObjectEntry {
                            key: key.clone(),
                            is_dir_marker: key.ends_with('/'),
                            size: object.data.len() as u64,
                            last_modified: Some(object.last_modified),
                        })
                    })
                    .collect(),
            }
        };
        Box::pin(stream::iter(entries))
    }
}
