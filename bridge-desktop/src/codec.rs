//! Raster image codec using the `image` crate
//!
//! Decoding is CPU-bound, so every operation runs on Tokio's blocking pool.

use async_trait::async_trait;
use bridge_traits::{
    blob::Blob,
    error::{BridgeError, Result},
    raster::{DecodedImage, ImageCodec, PixelData},
};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::debug;

/// Desktop [`ImageCodec`] built on `image`.
#[derive(Debug, Default, Clone)]
pub struct ImageCrateCodec;

impl ImageCrateCodec {
    pub fn new() -> Self {
        Self
    }

    /// Decode using the MIME type as a hint, falling back to content sniffing.
    pub(crate) fn load(blob: &Blob) -> Result<DynamicImage> {
        let decoded = match ImageFormat::from_mime_type(&blob.mime) {
            Some(format) => image::load_from_memory_with_format(&blob.data, format)
                .or_else(|_| image::load_from_memory(&blob.data)),
            None => image::load_from_memory(&blob.data),
        };

        decoded.map_err(|e| match e {
            image::ImageError::Unsupported(_) => {
                BridgeError::UnsupportedFormat(format!("{}: {}", blob.mime, e))
            }
            e => BridgeError::OperationFailed(format!("Failed to decode image: {}", e)),
        })
    }

    async fn blocking<T, F>(f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        tokio::task::spawn_blocking(f)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Image task failed: {}", e)))?
    }
}

#[async_trait]
impl ImageCodec for ImageCrateCodec {
    async fn extract_pixel_data(&self, blob: Blob) -> Result<PixelData> {
        Self::blocking(move || {
            let rgba = Self::load(&blob)?.to_rgba8();
            let (width, height) = rgba.dimensions();
            debug!(width, height, mime = %blob.mime, "Extracted pixel data");
            PixelData::new(rgba.into_raw(), width, height)
        })
        .await
    }

    async fn image_to_png(&self, blob: Blob) -> Result<Blob> {
        Self::blocking(move || {
            let image = Self::load(&blob)?;
            let mut buffer = Vec::new();
            image
                .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
                .map_err(|e| BridgeError::OperationFailed(format!("PNG encoding failed: {}", e)))?;
            Ok(Blob::new(buffer, "image/png"))
        })
        .await
    }

    async fn decode(&self, blob: &Blob) -> Result<DecodedImage> {
        let blob = blob.clone();
        Self::blocking(move || {
            let image = Self::load(&blob)?;
            Ok(DecodedImage {
                natural_width: image.width(),
                natural_height: image.height(),
            })
        })
        .await
    }
}
