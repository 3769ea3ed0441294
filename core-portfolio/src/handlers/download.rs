//! Handlers that send engine content out to the host.

use async_trait::async_trait;
use bridge_traits::Rgba8;
use tracing::{debug, info};

use super::{unexpected, FailurePolicy, MessageHandler};
use crate::context::BridgeContext;
use crate::error::HandlerError;
use crate::messages::{FrontendMessage, MessageType};

/// Output formats without an alpha channel.
const OPAQUE_FORMATS: [&str; 3] = ["jpeg", "jpg", "bmp"];

/// Background to flatten onto when `mime` cannot carry transparency.
pub(crate) fn raster_background(mime: &str) -> Option<Rgba8> {
    let mime = mime.to_ascii_lowercase();
    OPAQUE_FORMATS
        .iter()
        .any(|format| mime.ends_with(format))
        .then_some(Rgba8::WHITE)
}

pub struct DownloadTextFileHandler;

#[async_trait]
impl MessageHandler for DownloadTextFileHandler {
    fn message_type(&self) -> MessageType {
        MessageType::TriggerDownloadTextFile
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::DiagnosticLog
    }

    async fn handle(
        &self,
        ctx: &BridgeContext,
        message: FrontendMessage,
    ) -> Result<(), HandlerError> {
        let FrontendMessage::TriggerDownloadTextFile { name, document } = message else {
            return Err(unexpected(self.message_type(), &message));
        };

        ctx.io(
            "download text file",
            ctx.config().file_downloader.download_text(&name, &document),
        )
        .await?;
        info!(%name, bytes = document.len(), "Saved text file");
        Ok(())
    }
}

pub struct DownloadBlobUrlHandler;

#[async_trait]
impl MessageHandler for DownloadBlobUrlHandler {
    fn message_type(&self) -> MessageType {
        MessageType::TriggerDownloadBlobUrl
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::DiagnosticLog
    }

    async fn handle(
        &self,
        ctx: &BridgeContext,
        message: FrontendMessage,
    ) -> Result<(), HandlerError> {
        let FrontendMessage::TriggerDownloadBlobUrl {
            layer_name,
            blob_url,
        } = message
        else {
            return Err(unexpected(self.message_type(), &message));
        };

        let blob = ctx
            .io("resolve blob url", ctx.config().blob_store.fetch(&blob_url))
            .await?;
        let png = ctx
            .io("encode png", ctx.config().image_codec.image_to_png(blob))
            .await?;
        ctx.io(
            "download layer image",
            ctx.config().file_downloader.download_blob(&layer_name, png),
        )
        .await?;

        info!(%layer_name, "Saved layer image");
        Ok(())
    }
}

pub struct CopyToClipboardBlobUrlHandler;

#[async_trait]
impl MessageHandler for CopyToClipboardBlobUrlHandler {
    fn message_type(&self) -> MessageType {
        MessageType::TriggerCopyToClipboardBlobUrl
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::DiagnosticLog
    }

    async fn handle(
        &self,
        ctx: &BridgeContext,
        message: FrontendMessage,
    ) -> Result<(), HandlerError> {
        let FrontendMessage::TriggerCopyToClipboardBlobUrl { blob_url } = message else {
            return Err(unexpected(self.message_type(), &message));
        };

        ctx.io(
            "copy to clipboard",
            ctx.config().clipboard.copy_file_url(&blob_url),
        )
        .await?;
        debug!(url = %blob_url, "Copied image to clipboard");
        Ok(())
    }
}

pub struct DownloadRasterHandler;

#[async_trait]
impl MessageHandler for DownloadRasterHandler {
    fn message_type(&self) -> MessageType {
        MessageType::TriggerDownloadRaster
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::SilentDrop
    }

    async fn handle(
        &self,
        ctx: &BridgeContext,
        message: FrontendMessage,
    ) -> Result<(), HandlerError> {
        let FrontendMessage::TriggerDownloadRaster {
            svg,
            name,
            mime,
            size,
        } = message
        else {
            return Err(unexpected(self.message_type(), &message));
        };

        let (width, height) = size.pixel_dimensions();
        let background = raster_background(&mime);
        let blob = ctx
            .io(
                "rasterize export",
                ctx.config()
                    .svg_rasterizer
                    .rasterize_svg(&svg, width, height, &mime, background),
            )
            .await?;

        ctx.io(
            "download raster",
            ctx.config().file_downloader.download_blob(&name, blob),
        )
        .await?;
        info!(%name, %mime, width, height, "Saved raster export");
        Ok(())
    }
}
