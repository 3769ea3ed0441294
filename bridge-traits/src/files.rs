//! File Picker and Download Abstractions
//!
//! Hosts present a file picker to the user (upload) and hand generated files
//! back to the user (download). Neither operation is visible to the engine
//! directly.

use async_trait::async_trait;
use bytes::Bytes;

use crate::blob::Blob;
use crate::error::{BridgeError, Result};

/// Restriction applied to the files a picker offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptFilter {
    /// A file extension such as `graphite` or `.graphite`.
    Extension(String),
    /// A MIME pattern such as `image/*` or `image/png`.
    Mime(String),
}

impl AcceptFilter {
    /// Extension filter with any leading dot removed.
    pub fn extension(ext: impl AsRef<str>) -> Self {
        Self::Extension(ext.as_ref().trim_start_matches('.').to_string())
    }

    pub fn mime(pattern: impl Into<String>) -> Self {
        Self::Mime(pattern.into())
    }

    /// Checks a MIME type against a `Mime` filter. `Extension` filters never
    /// match by MIME type.
    pub fn accepts_mime(&self, mime: &str) -> bool {
        match self {
            AcceptFilter::Extension(_) => false,
            AcceptFilter::Mime(pattern) => match pattern.strip_suffix("/*") {
                Some(prefix) => mime
                    .split_once('/')
                    .is_some_and(|(kind, _)| kind.eq_ignore_ascii_case(prefix)),
                None => mime.eq_ignore_ascii_case(pattern),
            },
        }
    }
}

/// How the picked file's contents are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    Text,
    Binary,
}

/// File contents as read by the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadContent {
    Text(String),
    Binary(Bytes),
}

impl UploadContent {
    pub fn into_text(self) -> Result<String> {
        match self {
            UploadContent::Text(text) => Ok(text),
            UploadContent::Binary(bytes) => String::from_utf8(bytes.to_vec())
                .map_err(|e| BridgeError::OperationFailed(format!("Invalid UTF-8: {}", e))),
        }
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            UploadContent::Text(text) => Bytes::from(text),
            UploadContent::Binary(bytes) => bytes,
        }
    }
}

/// A file the user picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub content: UploadContent,
    /// MIME type reported by the host, empty when unknown.
    pub mime: String,
}

/// File picker trait
///
/// # Errors
///
/// Implementations must return [`BridgeError::Cancelled`] when the user
/// dismisses the picker, so callers can tell a cancellation apart from a
/// genuine read failure.
#[async_trait]
pub trait FileUploader: Send + Sync {
    async fn upload(&self, accept: AcceptFilter, mode: ReadMode) -> Result<UploadedFile>;
}

/// Hands files to the user (browser download, save into a downloads folder).
#[async_trait]
pub trait FileDownloader: Send + Sync {
    async fn download_text(&self, name: &str, text: &str) -> Result<()>;

    async fn download_blob(&self, name: &str, blob: Blob) -> Result<()>;
}
