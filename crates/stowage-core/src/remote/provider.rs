//! Remote adapter over the `object_store` crate.
//!
//! One adapter serves every cloud provider: the factory builds the matching
//! `object_store` client (S3, Azure Blob, GCS) and the adapter translates
//! between the collaborator trait and `object_store` semantics. Instances are
//! scoped to a single bucket at construction; bucket lifecycle is managed out
//! of band by the provider, so `create_bucket` is a benign no-op here and
//! `bucket_exists` probes the store with a bounded listing.

use std::sync::Arc;

use async_stream::stream;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::path::Path;
use object_store::{ObjectMeta, ObjectStore};
use tracing::{debug, info};

use super::{ByteChunks, ObjectStat, RawObjectEntry, RemoteClient, RemoveFailure};
use crate::config::RemoteConfig;
use crate::{Error, Result};

/// Bucket-scoped remote backed by an `object_store` client.
pub struct ObjectStoreRemote {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    prefix: Option<String>,
}

fn remote_err(op: &str, key: &str, err: object_store::Error) -> Error {
    match err {
        object_store::Error::NotFound { .. } => Error::NotFound(key.to_string()),
        other => Error::Backend(format!("{} {} failed: {}", op, key, other)),
    }
}

impl ObjectStoreRemote {
    /// Wrap an already-built `object_store` client scoped to `bucket`.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        prefix: Option<String>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            prefix,
        }
    }

    /// Build the provider client described by `config`.
    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        let prefix = config.prefix().map(str::to_string);
        let bucket = config.bucket().to_string();
        let store: Arc<dyn ObjectStore> = match config {
            RemoteConfig::S3 {
                bucket,
                region,
                endpoint,
                access_key,
                secret_key,
                allow_http,
                ..
            } => {
                let mut builder = AmazonS3Builder::new().with_bucket_name(bucket);
                if let Some(region) = region {
                    builder = builder.with_region(region);
                }
                if let Some(endpoint) = endpoint {
                    builder = builder.with_endpoint(endpoint);
                    // custom endpoints (MinIO, Ceph RGW) need path-style requests
                    builder = builder.with_virtual_hosted_style_request(false);
                }
                if let Some(access_key) = access_key {
                    builder = builder.with_access_key_id(access_key);
                }
                if let Some(secret_key) = secret_key {
                    builder = builder.with_secret_access_key(secret_key);
                }
                if *allow_http {
                    builder = builder.with_allow_http(true);
                }
                Arc::new(builder.build().map_err(|e| {
                    Error::Config(format!("failed to create S3 client: {}", e))
                })?)
            }
            RemoteConfig::Azure {
                account_name,
                container_name,
                account_key,
                ..
            } => {
                let mut builder = MicrosoftAzureBuilder::new()
                    .with_account(account_name)
                    .with_container_name(container_name);
                if let Some(account_key) = account_key {
                    builder = builder.with_access_key(account_key);
                }
                Arc::new(builder.build().map_err(|e| {
                    Error::Config(format!("failed to create Azure client: {}", e))
                })?)
            }
            RemoteConfig::Gcs {
                bucket,
                service_account_path,
                ..
            } => {
                let mut builder = GoogleCloudStorageBuilder::new().with_bucket_name(bucket);
                if let Some(path) = service_account_path {
                    builder = builder.with_service_account_path(path);
                }
                Arc::new(builder.build().map_err(|e| {
                    Error::Config(format!("failed to create GCS client: {}", e))
                })?)
            }
            RemoteConfig::Memory => Arc::new(object_store::memory::InMemory::new()),
        };

        info!(bucket = %bucket, prefix = ?prefix, "created object_store remote");
        Ok(Self::new(store, bucket, prefix))
    }

    fn scoped(&self, bucket: &str) -> Result<()> {
        if bucket == self.bucket {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "remote is scoped to bucket '{}', got '{}'",
                self.bucket, bucket
            )))
        }
    }

    /// Build the full store path for a key.
    fn full_path(&self, key: &str) -> Path {
        match &self.prefix {
            Some(prefix) => Path::from(format!("{}/{}", prefix.trim_end_matches('/'), key)),
            None => Path::from(key),
        }
    }

    /// Remove the configured scope prefix from an enumerated key.
    fn strip_scope(&self, key: String) -> String {
        match &self.prefix {
            Some(prefix) => key
                .strip_prefix(&format!("{}/", prefix.trim_end_matches('/')))
                .map(str::to_string)
                .unwrap_or(key),
            None => key,
        }
    }

    fn entry_from_meta(&self, meta: ObjectMeta) -> RawObjectEntry {
        let key = self.strip_scope(meta.location.to_string());
        let is_dir_marker = key.ends_with('/');
        RawObjectEntry {
            key,
            is_dir_marker,
            size: meta.size as u64,
            last_modified: Some(meta.last_modified),
        }
    }
}

#[async_trait]
impl RemoteClient for ObjectStoreRemote {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        self.scoped(bucket)?;
        debug!(bucket = %bucket, "bucket probe");
        match self.store.list_with_delimiter(None).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(Error::Backend(format!("bucket probe failed: {}", e))),
        }
    }

    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        self.scoped(bucket)?;
        // Container lifecycle is provisioned out of band for cloud remotes;
        // duplicate creation is already-exists, which callers must tolerate.
        debug!(bucket = %bucket, "create_bucket is a no-op for this remote");
        Ok(())
    }

    async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectStat> {
        self.scoped(bucket)?;
        let path = self.full_path(key);
        debug!(key = %path, "HEAD");
        let meta = self
            .store
            .head(&path)
            .await
            .map_err(|e| remote_err("HEAD", key, e))?;
        Ok(ObjectStat {
            size: meta.size as u64,
            last_modified: meta.last_modified,
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ByteChunks> {
        self.scoped(bucket)?;
        let path = self.full_path(key);
        debug!(key = %path, "GET");
        let result = self
            .store
            .get(&path)
            .await
            .map_err(|e| remote_err("GET", key, e))?;
        let key = key.to_string();
        Ok(Box::pin(result.into_stream().map(move |chunk| {
            chunk.map_err(|e| Error::Backend(format!("GET {} stream failed: {}", key, e)))
        })))
    }

    async fn put_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<()> {
        self.scoped(bucket)?;
        let path = self.full_path(key);
        debug!(key = %path, bytes = data.len(), "PUT");
        self.store
            .put(&path, data.into())
            .await
            .map_err(|e| Error::Backend(format!("PUT {} failed: {}", key, e)))?;
        Ok(())
    }

    async fn copy_object(&self, bucket: &str, src_key: &str, dst_key: &str) -> Result<()> {
        self.scoped(bucket)?;
        let src = self.full_path(src_key);
        let dst = self.full_path(dst_key);
        debug!(src = %src, dst = %dst, "COPY");
        self.store
            .copy(&src, &dst)
            .await
            .map_err(|e| remote_err("COPY", src_key, e))?;
        Ok(())
    }

    async fn remove_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.scoped(bucket)?;
        let path = self.full_path(key);
        debug!(key = %path, "DELETE");
        match self.store.delete(&path).await {
            Ok(()) => Ok(()),
            // removing an absent key is idempotent success
            Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(Error::Backend(format!("DELETE {} failed: {}", key, e))),
        }
    }

    async fn remove_objects(&self, bucket: &str, keys: &[String]) -> Result<Vec<RemoveFailure>> {
        self.scoped(bucket)?;
        debug!(count = keys.len(), "batch DELETE");
        let mut failures = Vec::new();
        for key in keys {
            let path = self.full_path(key);
            match self.store.delete(&path).await {
                Ok(()) => {}
                Err(object_store::Error::NotFound { .. }) => {}
                Err(e) => failures.push(RemoveFailure {
                    key: key.clone(),
                    message: e.to_string(),
                }),
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
        Box::pin(stream! {
            if let Err(e) = self.scoped(bucket) {
                yield Err(e);
                return;
            }
            let full_prefix = self.full_path(prefix);
            debug!(prefix = %full_prefix, recursive, "LIST");
            if recursive {
                let mut entries = self.store.list(Some(&full_prefix));
                while let Some(entry) = entries.next().await {
                    match entry {
                        Ok(meta) => yield Ok(self.entry_from_meta(meta)),
                        Err(e) => {
                            yield Err(remote_err("LIST", prefix, e));
                            return;
                        }
                    }
                }
            } else {
                match self.store.list_with_delimiter(Some(&full_prefix)).await {
                    Ok(listing) => {
                        for dir in listing.common_prefixes {
                            yield Ok(RawObjectEntry {
                                key: format!("{}/", self.strip_scope(dir.to_string())),
                                is_dir_marker: true,
                                size: 0,
                                last_modified: None,
                            });
                        }
                        for meta in listing.objects {
                            yield Ok(self.entry_from_meta(meta));
                        }
                    }
                    Err(e) => {
                        yield Err(remote_err("LIST", prefix, e));
                        return;
                    }
                }
            }
        })
    }
}
