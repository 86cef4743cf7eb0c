//! Configuration types for the storage facade.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Remote object-store configuration using a tagged enum for type-safe
/// configuration.
///
/// Supports:
/// - S3 and S3-compatible services (MinIO, Ceph RGW, etc.)
/// - Azure Blob Storage
/// - Google Cloud Storage
/// - In-memory (for testing)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider")]
pub enum RemoteConfig {
    /// AWS S3 or S3-compatible storage (MinIO, Ceph RGW, DigitalOcean Spaces, etc.)
    #[serde(rename = "s3")]
    S3 {
        /// S3 bucket name
        bucket: String,
        /// AWS region (e.g., "us-east-1")
        #[serde(default)]
        region: Option<String>,
        /// Custom endpoint URL (for S3-compatible services like MinIO)
        #[serde(default)]
        endpoint: Option<String>,
        /// Access key ID (falls back to AWS_ACCESS_KEY_ID env var)
        #[serde(default)]
        access_key: Option<String>,
        /// Secret access key (falls back to AWS_SECRET_ACCESS_KEY env var)
        #[serde(default)]
        secret_key: Option<String>,
        /// Key prefix under which all objects are scoped
        #[serde(default)]
        prefix: Option<String>,
        /// Allow HTTP (insecure) connections
        #[serde(default)]
        allow_http: bool,
    },

    /// Azure Blob Storage
    #[serde(rename = "azure")]
    Azure {
        /// Azure storage account name
        account_name: String,
        /// Azure blob container name
        container_name: String,
        /// Storage account key (if None, uses the default credential chain)
        #[serde(default)]
        account_key: Option<String>,
        /// Key prefix under which all objects are scoped
        #[serde(default)]
        prefix: Option<String>,
    },

    /// Google Cloud Storage
    #[serde(rename = "gcs")]
    Gcs {
        /// GCS bucket name
        bucket: String,
        /// Path to service account JSON key file (if None, uses Application
        /// Default Credentials)
        #[serde(default)]
        service_account_path: Option<String>,
        /// Key prefix under which all objects are scoped
        #[serde(default)]
        prefix: Option<String>,
    },

    /// In-memory remote (for testing)
    #[serde(rename = "memory")]
    Memory,
}

impl RemoteConfig {
    /// Parse configuration from a URL string.
    ///
    /// Supported URL formats:
    /// - `s3://bucket-name?region=us-east-1&endpoint=http://localhost:9000`
    /// - `azure://account.blob.core.windows.net/container`
    /// - `gcs://bucket-name?prefix=tenants/acme`
    /// - `memory://`
    ///
    /// Every cloud scheme accepts a `prefix` query parameter scoping all keys
    /// under a fixed key prefix.
    pub fn from_url(url: &str) -> Result<Self> {
        let parsed = url::Url::parse(url)
            .map_err(|e| Error::Config(format!("invalid storage URL: {}", e)))?;

        let query = |name: &str| {
            parsed
                .query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.to_string())
        };

        match parsed.scheme() {
            "s3" | "s3a" => {
                let bucket = parsed.host_str().unwrap_or_default().to_string();
                let endpoint = query("endpoint");
                let allow_http = endpoint
                    .as_ref()
                    .is_some_and(|e| e.starts_with("http://"));

                Ok(Self::S3 {
                    bucket,
                    region: query("region"),
                    endpoint,
                    access_key: std::env::var("AWS_ACCESS_KEY_ID").ok(),
                    secret_key: std::env::var("AWS_SECRET_ACCESS_KEY").ok(),
                    prefix: query("prefix"),
                    allow_http,
                })
            }
            "azure" | "az" => {
                let host = parsed.host_str().unwrap_or_default();
                let account_name = host.split('.').next().unwrap_or(host).to_string();
                let container_name = parsed.path().trim_start_matches('/').to_string();

                Ok(Self::Azure {
                    account_name,
                    container_name,
                    account_key: std::env::var("AZURE_STORAGE_KEY").ok(),
                    prefix: query("prefix"),
                })
            }
            "gcs" | "gs" => {
                let bucket = parsed.host_str().unwrap_or_default().to_string();

                Ok(Self::Gcs {
                    bucket,
                    service_account_path: std::env::var("GOOGLE_APPLICATION_CREDENTIALS").ok(),
                    prefix: query("prefix"),
                })
            }
            "memory" => Ok(Self::Memory),
            scheme => Err(Error::Config(format!("unknown storage scheme: {}", scheme))),
        }
    }

    /// The bucket/container this configuration addresses.
    pub fn bucket(&self) -> &str {
        match self {
            Self::S3 { bucket, .. } => bucket,
            Self::Azure { container_name, .. } => container_name,
            Self::Gcs { bucket, .. } => bucket,
            Self::Memory => "memory",
        }
    }

    /// Get the key prefix for this configuration.
    pub fn prefix(&self) -> Option<&str> {
        match self {
            Self::S3 { prefix, .. } => prefix.as_deref(),
            Self::Azure { prefix, .. } => prefix.as_deref(),
            Self::Gcs { prefix, .. } => prefix.as_deref(),
            Self::Memory => None,
        }
    }
}

/// Facade-level options, independent of the remote provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageOptions {
    /// Bucket/container every operation addresses
    pub bucket: String,
    /// Provision the bucket on first use when it does not exist
    #[serde(default = "default_auto_create")]
    pub auto_create_bucket: bool,
}

fn default_auto_create() -> bool {
    true
}

impl StorageOptions {
    /// Options with bucket auto-creation enabled.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            auto_create_bucket: true,
        }
    }
}
