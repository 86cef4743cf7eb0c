//! Staging of save inputs into a contiguous byte buffer.
//!
//! The remote writes whole objects, so every save source is drained into
//! memory first. Seekable sources contribute the bytes from their current
//! position onward; raw byte buffers pass through without copying.

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

use crate::{Error, Result};

const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Input to a save operation.
pub enum SaveSource {
    /// Bytes already in memory, written as-is.
    Bytes(Bytes),
    /// A positioned in-memory cursor; only bytes from the current position
    /// onward are written.
    Cursor(std::io::Cursor<Bytes>),
    /// A non-seekable async byte stream, drained to the end.
    Reader(Box<dyn AsyncRead + Send + Unpin>),
}

impl SaveSource {
    /// Wrap a non-seekable reader.
    pub fn reader(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self::Reader(Box::new(reader))
    }
}

impl From<Bytes> for SaveSource {
    fn from(data: Bytes) -> Self {
        Self::Bytes(data)
    }
}

impl From<Vec<u8>> for SaveSource {
    fn from(data: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(data))
    }
}

impl From<&str> for SaveSource {
    fn from(data: &str) -> Self {
        Self::Bytes(Bytes::copy_from_slice(data.as_bytes()))
    }
}

/// Drain a save source into a single buffer.
pub async fn stage(source: SaveSource, cancel: &CancellationToken) -> Result<Bytes> {
    match source {
        SaveSource::Bytes(data) => Ok(data),
        SaveSource::Cursor(cursor) => {
            let pos = (cursor.position() as usize).min(cursor.get_ref().len());
            Ok(cursor.get_ref().slice(pos..))
        }
        SaveSource::Reader(mut reader) => {
            let mut staged = BytesMut::new();
            let mut chunk = vec![0u8; READ_CHUNK_SIZE];
            loop {
                if cancel.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                let n = reader.read(&mut chunk).await?;
                if n == 0 {
                    break;
                }
                staged.extend_from_slice(&chunk[..n]);
            }
            Ok(staged.freeze())
        }
    }
}
