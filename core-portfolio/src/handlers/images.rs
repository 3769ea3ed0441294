//! Image decoding, region rasterization and object URL lifetime.

use async_trait::async_trait;
use bridge_traits::{Blob, BridgeError, DocumentId};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, trace};

use super::{unexpected, ExecutionMode, FailurePolicy, MessageHandler};
use crate::context::BridgeContext;
use crate::error::HandlerError;
use crate::messages::{FrontendMessage, ImageDataEntry, MessageType};

pub struct UpdateImageDataHandler;

impl UpdateImageDataHandler {
    /// Decode one entry and tell the engine where it lives.
    ///
    /// The object URL is revoked again if the image does not decode.
    async fn load_entry(
        ctx: &BridgeContext,
        document_id: DocumentId,
        entry: ImageDataEntry,
    ) -> Result<(), HandlerError> {
        let blob = Blob::new(entry.image_data, entry.mime);
        let blob_store = &ctx.config().blob_store;
        let url = blob_store.create_object_url(blob.clone());

        let decoded = match ctx
            .io("decode image", ctx.config().image_codec.decode(&blob))
            .await
        {
            Ok(decoded) => decoded,
            Err(err) => {
                blob_store.revoke(&url);
                return Err(err);
            }
        };

        ctx.notify_editor("set_image_blob_url", |editor| {
            editor.set_image_blob_url(
                document_id,
                &entry.path,
                entry.node_id,
                &url,
                decoded.natural_width,
                decoded.natural_height,
                entry.transform,
            )
        });
        Ok(())
    }
}

#[async_trait]
impl MessageHandler for UpdateImageDataHandler {
    fn message_type(&self) -> MessageType {
        MessageType::UpdateImageData
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::DiagnosticLog
    }

    async fn handle(
        &self,
        ctx: &BridgeContext,
        message: FrontendMessage,
    ) -> Result<(), HandlerError> {
        let FrontendMessage::UpdateImageData {
            document_id,
            image_data,
        } = message
        else {
            return Err(unexpected(self.message_type(), &message));
        };

        let total = image_data.len();
        let limit = Arc::new(Semaphore::new(ctx.settings().image_decode_concurrency));
        let mut tasks = JoinSet::new();

        for entry in image_data {
            let ctx = ctx.clone();
            let limit = Arc::clone(&limit);
            tasks.spawn(async move {
                let _permit = limit.acquire_owned().await.map_err(|_| {
                    BridgeError::OperationFailed("Image decode limiter closed".to_string())
                })?;
                Self::load_entry(&ctx, document_id, entry).await
            });
        }

        let mut failed = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    failed += 1;
                    error!(document_id, error = %err, "Failed to load image entry");
                }
                Err(join_err) => {
                    failed += 1;
                    error!(document_id, error = %join_err, "Image entry task aborted");
                }
            }
        }

        debug!(document_id, total, failed, "Image data processed");
        if failed > 0 {
            return Err(HandlerError::PartialFailure { failed, total });
        }
        Ok(())
    }
}

pub struct RasterizeRegionBelowLayerHandler;

#[async_trait]
impl MessageHandler for RasterizeRegionBelowLayerHandler {
    fn message_type(&self) -> MessageType {
        MessageType::TriggerRasterizeRegionBelowLayer
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::DiagnosticLog
    }

    async fn handle(
        &self,
        ctx: &BridgeContext,
        message: FrontendMessage,
    ) -> Result<(), HandlerError> {
        let FrontendMessage::TriggerRasterizeRegionBelowLayer {
            document_id,
            layer_path,
            svg,
            size,
        } = message
        else {
            return Err(unexpected(self.message_type(), &message));
        };

        if !size.has_area() {
            trace!(document_id, x = size.x, y = size.y, "Skipping empty region");
            return Ok(());
        }

        let (width, height) = size.pixel_dimensions();
        let canvas = ctx
            .io(
                "rasterize region",
                ctx.config()
                    .svg_rasterizer
                    .rasterize_svg_canvas(&svg, width, height),
            )
            .await?;

        let Some(pixels) = canvas.image_data() else {
            debug!(document_id, "Rasterized region has no image data");
            return Ok(());
        };

        ctx.notify_editor("render_graph_using_rasterized_region_below_layer", |editor| {
            editor.render_graph_using_rasterized_region_below_layer(
                document_id,
                &layer_path,
                &pixels.data,
                pixels.width,
                pixels.height,
            )
        });
        Ok(())
    }
}

pub struct RevokeBlobUrlHandler;

#[async_trait]
impl MessageHandler for RevokeBlobUrlHandler {
    fn message_type(&self) -> MessageType {
        MessageType::TriggerRevokeBlobUrl
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::DiagnosticLog
    }

    fn execution_mode(&self) -> ExecutionMode {
        ExecutionMode::Inline
    }

    async fn handle(
        &self,
        ctx: &BridgeContext,
        message: FrontendMessage,
    ) -> Result<(), HandlerError> {
        let FrontendMessage::TriggerRevokeBlobUrl { url } = message else {
            return Err(unexpected(self.message_type(), &message));
        };

        if !ctx.config().blob_store.revoke(&url) {
            return Err(BridgeError::NotFound(format!("Object URL {}", url)).into());
        }
        trace!(%url, "Revoked object URL");
        Ok(())
    }
}
