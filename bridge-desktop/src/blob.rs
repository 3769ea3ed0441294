//! Object URL registry backed by process memory

use async_trait::async_trait;
use bridge_traits::{
    blob::{Blob, BlobStore},
    error::{BridgeError, Result},
};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, trace};
use uuid::Uuid;

const URL_PREFIX: &str = "blob:editor-bridge/";

/// Keeps every registered blob alive until its URL is revoked.
#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, Blob>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of URLs that have not been revoked yet.
    pub fn live_urls(&self) -> usize {
        self.blobs
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Total bytes held by live URLs.
    pub fn retained_bytes(&self) -> usize {
        self.blobs
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .map(Blob::len)
            .sum()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    fn create_object_url(&self, blob: Blob) -> String {
        let url = format!("{}{}", URL_PREFIX, Uuid::new_v4());
        trace!(url = %url, size = blob.len(), mime = %blob.mime, "Created object URL");
        self.blobs
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(url.clone(), blob);
        url
    }

    async fn fetch(&self, url: &str) -> Result<Blob> {
        self.blobs
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(url)
            .cloned()
            .ok_or_else(|| BridgeError::NotFound(url.to_string()))
    }

    fn revoke(&self, url: &str) -> bool {
        let removed = self
            .blobs
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(url)
            .is_some();
        debug!(url = %url, removed, "Revoked object URL");
        removed
    }
}
