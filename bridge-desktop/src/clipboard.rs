//! System clipboard access using arboard

use arboard::{Clipboard, ImageData};
use async_trait::async_trait;
use bridge_traits::{
    blob::BlobStore,
    clipboard::ClipboardAccess,
    error::{BridgeError, Result},
};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::debug;

use crate::codec::ImageCrateCodec;

/// Copies images addressed by object URLs into the OS clipboard.
pub struct SystemClipboard {
    blobs: Arc<dyn BlobStore>,
}

impl SystemClipboard {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }
}

#[async_trait]
impl ClipboardAccess for SystemClipboard {
    async fn copy_file_url(&self, url: &str) -> Result<()> {
        let blob = self.blobs.fetch(url).await?;

        tokio::task::spawn_blocking(move || {
            let rgba = ImageCrateCodec::load(&blob)?.to_rgba8();
            let (width, height) = rgba.dimensions();

            let mut clipboard = Clipboard::new()
                .map_err(|e| BridgeError::NotAvailable(format!("Clipboard unavailable: {}", e)))?;
            clipboard
                .set_image(ImageData {
                    width: width as usize,
                    height: height as usize,
                    bytes: Cow::Owned(rgba.into_raw()),
                })
                .map_err(|e| BridgeError::OperationFailed(format!("Clipboard write failed: {}", e)))?;

            debug!(width, height, "Copied image to clipboard");
            Ok(())
        })
        .await
        .map_err(|e| BridgeError::OperationFailed(format!("Clipboard task failed: {}", e)))?
    }
}
