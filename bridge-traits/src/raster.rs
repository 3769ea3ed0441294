//! Image Decoding and SVG Rasterization Abstractions
//!
//! Pixel buffers crossing the bridge are always straight (non-premultiplied)
//! RGBA with 8 bits per channel, row-major, no padding.

use async_trait::async_trait;

use crate::blob::Blob;
use crate::error::{BridgeError, Result};

/// Straight-alpha RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl PixelData {
    /// Build a buffer, checking that `data` holds exactly `width * height` pixels.
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(BridgeError::OperationFailed(format!(
                "Pixel buffer holds {} bytes, expected {} for {}x{}",
                data.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }
}

/// Natural size of an image after a full decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedImage {
    pub natural_width: u32,
    pub natural_height: u32,
}

/// Solid background color used when flattening transparency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba8(pub [u8; 4]);

impl Rgba8 {
    pub const WHITE: Rgba8 = Rgba8([255, 255, 255, 255]);
}

/// Drawing surface produced by [`SvgRasterizer::rasterize_svg_canvas`].
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    width: u32,
    height: u32,
    pixels: Option<Vec<u8>>,
}

impl RasterCanvas {
    /// Wrap rendered RGBA8 pixels. A surface without readable pixels is
    /// represented with `None`.
    pub fn new(width: u32, height: u32, pixels: Option<Vec<u8>>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Read back the whole surface. Returns `None` when the surface has no
    /// readable pixel data (e.g. the backing context could not be created).
    pub fn image_data(&self) -> Option<PixelData> {
        let pixels = self.pixels.as_ref()?;
        PixelData::new(pixels.clone(), self.width, self.height).ok()
    }
}

/// Decodes and re-encodes raster images.
#[async_trait]
pub trait ImageCodec: Send + Sync {
    /// Decode an encoded image into raw RGBA8 pixels.
    async fn extract_pixel_data(&self, blob: Blob) -> Result<PixelData>;

    /// Re-encode any decodable image as PNG.
    async fn image_to_png(&self, blob: Blob) -> Result<Blob>;

    /// Fully decode an image so it can be drawn immediately, returning its
    /// natural dimensions.
    async fn decode(&self, blob: &Blob) -> Result<DecodedImage>;
}

/// Rasterizes SVG markup.
#[async_trait]
pub trait SvgRasterizer: Send + Sync {
    /// Render `svg` at `width`x`height` and encode the result as `mime`.
    ///
    /// # Errors
    ///
    /// Fails on degenerate (zero-area) targets, unparsable markup and
    /// unsupported output formats.
    async fn rasterize_svg(
        &self,
        svg: &str,
        width: u32,
        height: u32,
        mime: &str,
        background: Option<Rgba8>,
    ) -> Result<Blob>;

    /// Render `svg` onto a drawing surface without encoding it.
    async fn rasterize_svg_canvas(&self, svg: &str, width: u32, height: u32)
        -> Result<RasterCanvas>;
}
