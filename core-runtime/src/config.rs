//! # Bridge Configuration Module
//!
//! Holds every host adapter the bridge needs plus its tunable settings.
//!
//! ## Overview
//!
//! The configuration uses a builder to construct a [`BridgeConfig`]. Each
//! adapter is injected as an `Arc<dyn Trait>`. With the `desktop-shims`
//! feature, any adapter left unset falls back to its `bridge-desktop`
//! implementation; without it, `build()` fails fast naming the missing
//! capability.
//!
//! ## Usage
//!
//! ### Desktop Defaults
//!
//! ```ignore
//! use core_runtime::config::BridgeConfig;
//!
//! let config = BridgeConfig::builder()
//!     .image_decode_concurrency(4)
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ### Custom Adapters
//!
//! ```ignore
//! use core_runtime::config::{BridgeConfig, UploadCancelPolicy};
//! use std::sync::Arc;
//!
//! let config = BridgeConfig::builder()
//!     .http_client(Arc::new(MyHttpClient))
//!     .file_uploader(Arc::new(MyFilePicker))
//!     .upload_cancel_policy(UploadCancelPolicy::ErrorDialog)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{
    BlobStore, ClipboardAccess, FileDownloader, FileUploader, HttpClient, ImageCodec,
    SvgRasterizer,
};
use std::sync::Arc;
use std::time::Duration;

/// Default name for documents whose URL has no usable last path segment.
pub const DEFAULT_DOCUMENT_NAME: &str = "Untitled";

/// Default bound on concurrently decoding image entries.
pub const DEFAULT_IMAGE_DECODE_CONCURRENCY: usize = 8;

const MAX_IMAGE_DECODE_CONCURRENCY: usize = 256;

/// What to do when the user dismisses a file picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadCancelPolicy {
    /// Log at debug level and do nothing else.
    #[default]
    Silent,
    /// Treat the cancellation like a read failure and show the error dialog.
    ErrorDialog,
}

/// Tunable behaviour of the message handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSettings {
    /// Filename used when a fetched URL has no final path segment.
    pub fallback_document_name: String,

    pub upload_cancel_policy: UploadCancelPolicy,

    /// Maximum number of image entries decoded at the same time.
    pub image_decode_concurrency: usize,

    /// Deadline for each host I/O call. `None` waits indefinitely.
    pub io_timeout: Option<Duration>,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            fallback_document_name: DEFAULT_DOCUMENT_NAME.to_string(),
            upload_cancel_policy: UploadCancelPolicy::default(),
            image_decode_concurrency: DEFAULT_IMAGE_DECODE_CONCURRENCY,
            io_timeout: None,
        }
    }
}

impl BridgeSettings {
    /// Validates the settings
    pub fn validate(&self) -> Result<()> {
        if self.fallback_document_name.trim().is_empty() {
            return Err(Error::Config(
                "Fallback document name cannot be empty".to_string(),
            ));
        }

        if self.image_decode_concurrency == 0 {
            return Err(Error::Config(
                "Image decode concurrency must be at least 1".to_string(),
            ));
        }

        if self.image_decode_concurrency > MAX_IMAGE_DECODE_CONCURRENCY {
            return Err(Error::Config(format!(
                "Image decode concurrency exceeds maximum of {}",
                MAX_IMAGE_DECODE_CONCURRENCY
            )));
        }

        if self.io_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(Error::Config(
                "I/O timeout must be greater than zero when set".to_string(),
            ));
        }

        Ok(())
    }
}

/// Host adapters and settings for the editor bridge.
///
/// Use [`BridgeConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct BridgeConfig {
    pub http_client: Arc<dyn HttpClient>,
    pub file_uploader: Arc<dyn FileUploader>,
    pub file_downloader: Arc<dyn FileDownloader>,
    pub clipboard: Arc<dyn ClipboardAccess>,
    pub image_codec: Arc<dyn ImageCodec>,
    pub svg_rasterizer: Arc<dyn SvgRasterizer>,
    pub blob_store: Arc<dyn BlobStore>,
    pub settings: BridgeSettings,
}

impl std::fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("http_client", &"HttpClient { ... }")
            .field("file_uploader", &"FileUploader { ... }")
            .field("file_downloader", &"FileDownloader { ... }")
            .field("clipboard", &"ClipboardAccess { ... }")
            .field("image_codec", &"ImageCodec { ... }")
            .field("svg_rasterizer", &"SvgRasterizer { ... }")
            .field("blob_store", &"BlobStore { ... }")
            .field("settings", &self.settings)
            .finish()
    }
}

impl BridgeConfig {
    /// Creates a new builder for constructing a `BridgeConfig`.
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.settings.validate()
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn missing(capability: &str, purpose: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: format!(
            "{} implementation is required to {}. \
             Desktop: enable the 'desktop-shims' feature to use the bridge-desktop default. \
             Other hosts: inject a platform-native adapter.",
            capability, purpose
        ),
    }
}

#[cfg(feature = "desktop-shims")]
mod defaults {
    use super::*;
    use bridge_desktop::{
        DownloadsFolder, ImageCrateCodec, InMemoryBlobStore, NativeFilePicker, ReqwestHttpClient,
        ResvgRasterizer, SystemClipboard,
    };

    pub(super) fn http_client() -> Result<Arc<dyn HttpClient>> {
        let client = ReqwestHttpClient::new().map_err(|e| {
            Error::Internal(format!("Failed to initialize default HttpClient: {}", e))
        })?;
        Ok(Arc::new(client))
    }

    pub(super) fn file_uploader() -> Result<Arc<dyn FileUploader>> {
        Ok(Arc::new(NativeFilePicker::new()))
    }

    pub(super) fn file_downloader() -> Result<Arc<dyn FileDownloader>> {
        Ok(Arc::new(DownloadsFolder::new()))
    }

    pub(super) fn clipboard(blobs: &Arc<dyn BlobStore>) -> Result<Arc<dyn ClipboardAccess>> {
        Ok(Arc::new(SystemClipboard::new(Arc::clone(blobs))))
    }

    pub(super) fn image_codec() -> Result<Arc<dyn ImageCodec>> {
        Ok(Arc::new(ImageCrateCodec::new()))
    }

    pub(super) fn svg_rasterizer() -> Result<Arc<dyn SvgRasterizer>> {
        Ok(Arc::new(ResvgRasterizer::new()))
    }

    pub(super) fn blob_store() -> Result<Arc<dyn BlobStore>> {
        Ok(Arc::new(InMemoryBlobStore::new()))
    }
}

#[cfg(not(feature = "desktop-shims"))]
mod defaults {
    use super::*;

    pub(super) fn http_client() -> Result<Arc<dyn HttpClient>> {
        Err(missing("HttpClient", "fetch documents opened by URL"))
    }

    pub(super) fn file_uploader() -> Result<Arc<dyn FileUploader>> {
        Err(missing("FileUploader", "open and import files"))
    }

    pub(super) fn file_downloader() -> Result<Arc<dyn FileDownloader>> {
        Err(missing("FileDownloader", "save exported files"))
    }

    pub(super) fn clipboard(_blobs: &Arc<dyn BlobStore>) -> Result<Arc<dyn ClipboardAccess>> {
        Err(missing("ClipboardAccess", "copy images to the clipboard"))
    }

    pub(super) fn image_codec() -> Result<Arc<dyn ImageCodec>> {
        Err(missing("ImageCodec", "decode and re-encode images"))
    }

    pub(super) fn svg_rasterizer() -> Result<Arc<dyn SvgRasterizer>> {
        Err(missing("SvgRasterizer", "rasterize SVG exports"))
    }

    pub(super) fn blob_store() -> Result<Arc<dyn BlobStore>> {
        Err(missing("BlobStore", "address in-memory images by URL"))
    }
}

/// Builder for constructing [`BridgeConfig`] instances.
#[derive(Default)]
pub struct BridgeConfigBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    file_uploader: Option<Arc<dyn FileUploader>>,
    file_downloader: Option<Arc<dyn FileDownloader>>,
    clipboard: Option<Arc<dyn ClipboardAccess>>,
    image_codec: Option<Arc<dyn ImageCodec>>,
    svg_rasterizer: Option<Arc<dyn SvgRasterizer>>,
    blob_store: Option<Arc<dyn BlobStore>>,
    settings: BridgeSettings,
}

impl BridgeConfigBuilder {
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn file_uploader(mut self, uploader: Arc<dyn FileUploader>) -> Self {
        self.file_uploader = Some(uploader);
        self
    }

    pub fn file_downloader(mut self, downloader: Arc<dyn FileDownloader>) -> Self {
        self.file_downloader = Some(downloader);
        self
    }

    pub fn clipboard(mut self, clipboard: Arc<dyn ClipboardAccess>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn image_codec(mut self, codec: Arc<dyn ImageCodec>) -> Self {
        self.image_codec = Some(codec);
        self
    }

    pub fn svg_rasterizer(mut self, rasterizer: Arc<dyn SvgRasterizer>) -> Self {
        self.svg_rasterizer = Some(rasterizer);
        self
    }

    /// Set the object URL registry.
    ///
    /// The default desktop clipboard resolves URLs through this same store,
    /// so set it before relying on the clipboard default.
    pub fn blob_store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.blob_store = Some(store);
        self
    }

    pub fn fallback_document_name(mut self, name: impl Into<String>) -> Self {
        self.settings.fallback_document_name = name.into();
        self
    }

    pub fn upload_cancel_policy(mut self, policy: UploadCancelPolicy) -> Self {
        self.settings.upload_cancel_policy = policy;
        self
    }

    pub fn image_decode_concurrency(mut self, limit: usize) -> Self {
        self.settings.image_decode_concurrency = limit;
        self
    }

    pub fn io_timeout(mut self, timeout: Duration) -> Self {
        self.settings.io_timeout = Some(timeout);
        self
    }

    pub fn settings(mut self, settings: BridgeSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Builds the configuration, filling unset adapters with platform defaults.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] when an adapter is unset and no default exists
    /// - [`Error::Config`] when a setting is out of range
    pub fn build(self) -> Result<BridgeConfig> {
        // Validate settings before constructing any default adapter.
        self.settings.validate()?;

        let blob_store = match self.blob_store {
            Some(store) => store,
            None => defaults::blob_store()?,
        };

        let clipboard = match self.clipboard {
            Some(clipboard) => clipboard,
            None => defaults::clipboard(&blob_store)?,
        };

        let config = BridgeConfig {
            http_client: match self.http_client {
                Some(client) => client,
                None => defaults::http_client()?,
            },
            file_uploader: match self.file_uploader {
                Some(uploader) => uploader,
                None => defaults::file_uploader()?,
            },
            file_downloader: match self.file_downloader {
                Some(downloader) => downloader,
                None => defaults::file_downloader()?,
            },
            clipboard,
            image_codec: match self.image_codec {
                Some(codec) => codec,
                None => defaults::image_codec()?,
            },
            svg_rasterizer: match self.svg_rasterizer {
                Some(rasterizer) => rasterizer,
                None => defaults::svg_rasterizer()?,
            },
            blob_store,
            settings: self.settings,
        };

        config.validate()?;

        Ok(config)
    }
}
