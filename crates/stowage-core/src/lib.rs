//! Bucket-oriented file storage over remote object stores.
//!
//! The crate exposes one facade, [`FileStorage`], that adapts a path-oriented
//! file API (get, save, exists, rename, copy, delete, list) onto a remote
//! bucket-oriented object store. Backends are provided through the
//! [`remote::RemoteClient`] trait; adapters ship for AWS S3, Azure Blob
//! Storage and Google Cloud Storage via the `object_store` crate, plus an
//! in-memory remote for tests.
//!
//! # Example
//!
//! ```no_run
//! use stowage_core::{FileStorage, RemoteConfig, SaveSource};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> stowage_core::Result<()> {
//! let config = RemoteConfig::from_url("s3://my-bucket?region=us-east-1")?;
//! let storage = FileStorage::open(&config)?;
//! let cancel = CancellationToken::new();
//!
//! storage.save("docs/readme.md", SaveSource::from("hello"), &cancel).await?;
//! let listing = storage.list(Some("docs/*.md"), &cancel).await?;
//! # let _ = listing;
//! # Ok(())
//! # }
//! ```

pub mod config;
mod deleter;
pub mod error;
pub mod lister;
pub mod page;
pub mod path;
pub mod pattern;
pub mod remote;
pub mod stage;
pub mod storage;

pub use config::{RemoteConfig, StorageOptions};
pub use error::{Error, Result};
pub use lister::FileSpec;
pub use page::{Page, PageCursor, PageState};
pub use pattern::SearchCriteria;
pub use remote::{
    create_remote, ByteChunks, MemoryRemote, ObjectStat, ObjectStoreRemote, RawObjectEntry,
    RemoteClient, RemoveFailure,
};
pub use stage::SaveSource;
pub use storage::FileStorage;
