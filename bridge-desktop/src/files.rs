//! Native file dialog and downloads folder

use async_trait::async_trait;
use bridge_traits::{
    blob::Blob,
    error::{BridgeError, Result},
    files::{AcceptFilter, FileDownloader, FileUploader, ReadMode, UploadContent, UploadedFile},
};
use bytes::Bytes;
use image::ImageFormat;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Native open-file dialog.
///
/// A dismissed dialog is reported as [`BridgeError::Cancelled`]. The picked
/// file is checked against the accept filter again after selection, since
/// some platforms let the user switch the dialog to "All files".
#[derive(Debug, Default, Clone)]
pub struct NativeFilePicker {
    start_dir: Option<PathBuf>,
}

impl NativeFilePicker {
    /// Open dialogs in the user's documents folder, falling back to home.
    pub fn new() -> Self {
        Self {
            start_dir: dirs::document_dir().or_else(dirs::home_dir),
        }
    }

    pub fn with_directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            start_dir: Some(dir.into()),
        }
    }

    fn dialog(&self, accept: &AcceptFilter) -> rfd::AsyncFileDialog {
        let mut dialog = rfd::AsyncFileDialog::new();
        if let Some(dir) = &self.start_dir {
            dialog = dialog.set_directory(dir);
        }

        let extensions = dialog_extensions(accept);
        if !extensions.is_empty() {
            let label = match accept {
                AcceptFilter::Extension(ext) => ext.clone(),
                AcceptFilter::Mime(pattern) if pattern.starts_with("image/") => {
                    "Images".to_string()
                }
                AcceptFilter::Mime(pattern) => pattern.clone(),
            };
            let extensions: Vec<&str> = extensions.iter().map(String::as_str).collect();
            dialog = dialog.add_filter(label, extensions.as_slice());
        }
        dialog
    }
}

/// File extensions the dialog offers for an accept filter. Empty means no
/// restriction can be expressed as extensions.
pub(crate) fn dialog_extensions(accept: &AcceptFilter) -> Vec<String> {
    match accept {
        AcceptFilter::Extension(ext) => vec![ext.clone()],
        AcceptFilter::Mime(pattern) => {
            let pattern = pattern.to_ascii_lowercase();
            let formats: Vec<ImageFormat> = if pattern == "image/*" {
                ImageFormat::all()
                    .filter(|format| format.reading_enabled())
                    .collect()
            } else {
                ImageFormat::from_mime_type(&pattern).into_iter().collect()
            };

            let mut extensions: Vec<String> = formats
                .iter()
                .flat_map(|format| format.extensions_str())
                .map(|ext| ext.to_string())
                .collect();
            if pattern == "image/*" || pattern == "image/svg+xml" {
                extensions.push("svg".to_string());
            }
            extensions
        }
    }
}

fn check_filter(path: &Path, accept: &AcceptFilter, mime: &str) -> Result<()> {
    let accepted = match accept {
        AcceptFilter::Extension(ext) => path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext)),
        AcceptFilter::Mime(_) => accept.accepts_mime(mime),
    };

    if accepted {
        Ok(())
    } else {
        Err(BridgeError::UnsupportedFormat(format!(
            "{} does not match {:?}",
            path.display(),
            accept
        )))
    }
}

/// Best-effort MIME type from a file extension.
pub(crate) fn guess_mime(path: &Path) -> &'static str {
    if let Ok(format) = ImageFormat::from_path(path) {
        return format.to_mime_type();
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("svg") => "image/svg+xml",
        Some(ext) if ext.eq_ignore_ascii_case("txt") => "text/plain",
        Some(ext) if ext.eq_ignore_ascii_case("json") => "application/json",
        _ => FALLBACK_MIME,
    }
}

/// Read a file the user picked, enforcing the accept filter.
pub(crate) async fn read_picked(
    path: &Path,
    accept: &AcceptFilter,
    mode: ReadMode,
) -> Result<UploadedFile> {
    let mime = guess_mime(path);
    check_filter(path, accept, mime)?;

    let data = fs::read(path).await?;
    let content = match mode {
        ReadMode::Text => UploadContent::Text(String::from_utf8(data).map_err(|e| {
            BridgeError::OperationFailed(format!("{} is not UTF-8: {}", path.display(), e))
        })?),
        ReadMode::Binary => UploadContent::Binary(Bytes::from(data)),
    };

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    debug!(file = %filename, mime, "Read picked file");

    Ok(UploadedFile {
        filename,
        content,
        mime: mime.to_string(),
    })
}

#[async_trait]
impl FileUploader for NativeFilePicker {
    async fn upload(&self, accept: AcceptFilter, mode: ReadMode) -> Result<UploadedFile> {
        let handle = self
            .dialog(&accept)
            .pick_file()
            .await
            .ok_or(BridgeError::Cancelled)?;
        read_picked(handle.path(), &accept, mode).await
    }
}

/// Saves downloads into a folder, never overwriting existing files.
pub struct DownloadsFolder {
    dir: PathBuf,
}

impl DownloadsFolder {
    /// Use the user's download directory, falling back to the temp directory.
    pub fn new() -> Self {
        let dir = dirs::download_dir().unwrap_or_else(std::env::temp_dir);
        Self { dir }
    }

    pub fn with_directory(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// Strip anything that would escape the downloads folder.
    fn sanitize(name: &str) -> String {
        let cleaned: String = name
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '\0' => '_',
                c => c,
            })
            .collect();
        let cleaned = cleaned.trim().trim_start_matches('.').to_string();
        if cleaned.is_empty() {
            "download".to_string()
        } else {
            cleaned
        }
    }

    /// Candidate paths in order: `name.ext`, `name (1).ext`, `name (2).ext`...
    fn candidate(&self, name: &str, attempt: u32) -> PathBuf {
        if attempt == 0 {
            return self.dir.join(name);
        }
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => {
                self.dir.join(format!("{} ({}).{}", stem, attempt, ext))
            }
            _ => self.dir.join(format!("{} ({})", name, attempt)),
        }
    }

    /// Claim the first free candidate with `create_new`, so concurrent saves
    /// of the same name each get their own file.
    async fn write(&self, name: &str, data: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).await?;
        let name = Self::sanitize(name);

        let mut attempt = 0u32;
        let (path, mut file) = loop {
            let path = self.candidate(&name, attempt);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        };

        file.write_all(data).await?;
        file.flush().await?;
        debug!(path = ?path, size = data.len(), "Saved download");
        Ok(path)
    }
}

impl Default for DownloadsFolder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileDownloader for DownloadsFolder {
    async fn download_text(&self, name: &str, text: &str) -> Result<()> {
        self.write(name, text.as_bytes()).await.map(|_| ())
    }

    async fn download_blob(&self, name: &str, blob: Blob) -> Result<()> {
        self.write(name, &blob.data).await.map(|_| ())
    }
}
