//! # Desktop Bridge Implementations
//!
//! Default implementations of the host adapter traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `FileUploader` as a native open-file dialog using `rfd` (`NativeFilePicker`)
//! - `FileDownloader` saving into the user's downloads folder (`DownloadsFolder`)
//! - `ImageCodec` using the `image` crate
//! - `SvgRasterizer` using `resvg`
//! - `BlobStore` as an in-process object URL registry
//! - `ClipboardAccess` using `arboard`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{InMemoryBlobStore, SystemClipboard};
//! use std::sync::Arc;
//!
//! let blobs = Arc::new(InMemoryBlobStore::new());
//! let clipboard = SystemClipboard::new(blobs.clone());
//! ```

mod blob;
mod clipboard;
mod codec;
mod files;
mod http;
mod raster;

pub use blob::InMemoryBlobStore;
pub use clipboard::SystemClipboard;
pub use codec::ImageCrateCodec;
pub use files::{DownloadsFolder, NativeFilePicker};
pub use http::ReqwestHttpClient;
pub use raster::ResvgRasterizer;
