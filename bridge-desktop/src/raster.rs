//! SVG rasterization using resvg

use async_trait::async_trait;
use bridge_traits::{
    blob::Blob,
    error::{BridgeError, Result},
    raster::{RasterCanvas, Rgba8, SvgRasterizer},
};
use image::{DynamicImage, ImageFormat, RgbaImage};
use resvg::tiny_skia::{self, Pixmap};
use resvg::usvg::{Options, Tree};
use std::io::Cursor;
use tracing::debug;

/// Desktop [`SvgRasterizer`] built on `resvg`.
///
/// The SVG is stretched to exactly fill the requested size.
#[derive(Debug, Default, Clone)]
pub struct ResvgRasterizer;

impl ResvgRasterizer {
    pub fn new() -> Self {
        Self
    }

    fn render(svg: &str, width: u32, height: u32, background: Option<Rgba8>) -> Result<Pixmap> {
        let tree = Tree::from_str(svg, &Options::default())
            .map_err(|e| BridgeError::OperationFailed(format!("Invalid SVG: {}", e)))?;

        // Zero-area or oversized targets have no backing pixmap.
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            BridgeError::OperationFailed(format!(
                "Cannot allocate a {}x{} raster target",
                width, height
            ))
        })?;

        if let Some(Rgba8([r, g, b, a])) = background {
            pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, a));
        }

        let size = tree.size();
        let transform = tiny_skia::Transform::from_scale(
            width as f32 / size.width(),
            height as f32 / size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        Ok(pixmap)
    }

    /// tiny-skia stores premultiplied alpha; the bridge speaks straight alpha.
    fn straight_rgba(pixmap: &Pixmap) -> Vec<u8> {
        pixmap
            .pixels()
            .iter()
            .flat_map(|pixel| {
                let color = pixel.demultiply();
                [color.red(), color.green(), color.blue(), color.alpha()]
            })
            .collect()
    }

    /// Output format for a MIME type. `image/jpg` is accepted as an alias of `image/jpeg`.
    fn output_format(mime: &str) -> Result<ImageFormat> {
        let normalized = mime.trim().to_ascii_lowercase();
        let normalized = match normalized.as_str() {
            "image/jpg" => "image/jpeg",
            other => other,
        };
        ImageFormat::from_mime_type(normalized)
            .ok_or_else(|| BridgeError::UnsupportedFormat(mime.to_string()))
    }

    fn encode(pixmap: &Pixmap, mime: &str) -> Result<Blob> {
        let format = Self::output_format(mime)?;
        let mime = format.to_mime_type();

        if format == ImageFormat::Png {
            let data = pixmap
                .encode_png()
                .map_err(|e| BridgeError::OperationFailed(format!("PNG encoding failed: {}", e)))?;
            return Ok(Blob::new(data, mime));
        }

        let rgba = RgbaImage::from_raw(pixmap.width(), pixmap.height(), Self::straight_rgba(pixmap))
            .ok_or_else(|| BridgeError::OperationFailed("Pixel buffer size mismatch".to_string()))?;

        // JPEG has no alpha channel.
        let image = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).to_rgb8()),
            ImageFormat::Bmp | ImageFormat::WebP => DynamicImage::ImageRgba8(rgba),
            other => return Err(BridgeError::UnsupportedFormat(format!("{:?}", other))),
        };

        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), format)
            .map_err(|e| BridgeError::OperationFailed(format!("Encoding failed: {}", e)))?;
        Ok(Blob::new(buffer, mime))
    }
}

#[async_trait]
impl SvgRasterizer for ResvgRasterizer {
    async fn rasterize_svg(
        &self,
        svg: &str,
        width: u32,
        height: u32,
        mime: &str,
        background: Option<Rgba8>,
    ) -> Result<Blob> {
        let svg = svg.to_string();
        let mime = mime.to_string();
        tokio::task::spawn_blocking(move || {
            let pixmap = Self::render(&svg, width, height, background)?;
            let blob = Self::encode(&pixmap, &mime)?;
            debug!(width, height, mime = %mime, size = blob.len(), "Rasterized SVG");
            Ok(blob)
        })
        .await
        .map_err(|e| BridgeError::OperationFailed(format!("Raster task failed: {}", e)))?
    }

    async fn rasterize_svg_canvas(
        &self,
        svg: &str,
        width: u32,
        height: u32,
    ) -> Result<RasterCanvas> {
        let svg = svg.to_string();
        tokio::task::spawn_blocking(move || {
            let pixmap = Self::render(&svg, width, height, None)?;
            Ok(RasterCanvas::new(
                width,
                height,
                Some(Self::straight_rgba(&pixmap)),
            ))
        })
        .await
        .map_err(|e| BridgeError::OperationFailed(format!("Raster task failed: {}", e)))?
    }
}
