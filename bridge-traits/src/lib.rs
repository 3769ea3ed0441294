//! # Host Bridge Traits
//!
//! Capabilities the editor bridge needs from its host environment, expressed
//! as traits so each host (desktop shell, browser, test harness) can supply
//! its own implementation.
//!
//! ## Overview
//!
//! The document engine cannot perform privileged I/O. It emits intent
//! messages, and the bridge fulfils them through the adapters defined here,
//! then reports results back through [`EditorInstance`](editor::EditorInstance).
//!
//! ## Traits
//!
//! ### Files & Network
//! - [`HttpClient`](http::HttpClient) - Fetch remote documents
//! - [`FileUploader`](files::FileUploader) - Present a file picker and read the selection
//! - [`FileDownloader`](files::FileDownloader) - Hand generated files to the user
//!
//! ### Images
//! - [`ImageCodec`](raster::ImageCodec) - Pixel extraction, PNG re-encoding, pre-decoding
//! - [`SvgRasterizer`](raster::SvgRasterizer) - SVG to encoded image or pixel surface
//! - [`BlobStore`](blob::BlobStore) - Object URLs for in-memory binaries
//!
//! ### Platform Integration
//! - [`ClipboardAccess`](clipboard::ClipboardAccess) - System clipboard writes
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ### Engine
//! - [`EditorInstance`](editor::EditorInstance) - Calls back into the engine
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Available |
//! | Web      | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! All adapters report failures with [`BridgeError`](error::BridgeError).
//! File pickers must map a dismissed dialog to `BridgeError::Cancelled` so the
//! bridge can apply its cancellation policy instead of reporting an error.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` so adapters can be shared across handler
//! tasks behind an `Arc`.

pub mod blob;
pub mod clipboard;
pub mod editor;
pub mod error;
pub mod files;
pub mod http;
pub mod log;
pub mod raster;

pub use error::BridgeError;

// Re-export commonly used types
pub use blob::{Blob, BlobStore};
pub use clipboard::ClipboardAccess;
pub use editor::{DocumentId, EditorInstance, LayerId, NodeId, Transform};
pub use files::{AcceptFilter, FileDownloader, FileUploader, ReadMode, UploadContent, UploadedFile};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use log::{redact_url, ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use raster::{DecodedImage, ImageCodec, PixelData, RasterCanvas, Rgba8, SvgRasterizer};
