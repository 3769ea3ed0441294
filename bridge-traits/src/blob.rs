//! In-memory binary objects and host-addressable references to them.
//!
//! A [`Blob`] is an immutable byte buffer tagged with a MIME type. The host can
//! hand out an opaque object URL for a blob so the engine can refer to the
//! bytes without copying them across the bridge boundary.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Immutable binary payload with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub data: Bytes,
    pub mime: String,
}

impl Blob {
    pub fn new(data: impl Into<Bytes>, mime: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime: mime.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Registry of host-addressable blob references (object URLs).
///
/// The store never releases a reference on its own. Whoever created a URL
/// owns it and must eventually call [`BlobStore::revoke`].
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Register a blob and return a fresh URL that resolves to it.
    fn create_object_url(&self, blob: Blob) -> String;

    /// Resolve a previously created URL back into its bytes.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::NotFound` if the URL was never created or has
    /// already been revoked.
    async fn fetch(&self, url: &str) -> Result<Blob>;

    /// Release a URL. Returns `false` when the URL was unknown.
    fn revoke(&self, url: &str) -> bool;
}
