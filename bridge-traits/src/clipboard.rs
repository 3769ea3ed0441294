//! Clipboard Abstraction

use async_trait::async_trait;

use crate::error::Result;

/// Writes host-addressable files into the system clipboard.
#[async_trait]
pub trait ClipboardAccess: Send + Sync {
    /// Copy the content behind an object URL (typically an image) to the clipboard.
    async fn copy_file_url(&self, url: &str) -> Result<()>;
}
