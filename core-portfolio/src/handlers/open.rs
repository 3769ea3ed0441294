//! Handlers that bring outside content into the engine.

use async_trait::async_trait;
use bridge_traits::{AcceptFilter, Blob, HttpRequest, ReadMode};
use core_runtime::logging::redact_url;
use tracing::{debug, info};
use url::Url;

use super::{unexpected, FailurePolicy, MessageHandler};
use crate::context::BridgeContext;
use crate::error::HandlerError;
use crate::messages::{FrontendMessage, MessageType};

/// Final path segment of `url`, or `fallback` when it is empty.
pub(crate) fn document_name(url: &Url, fallback: &str) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

pub struct FetchAndOpenDocumentHandler;

#[async_trait]
impl MessageHandler for FetchAndOpenDocumentHandler {
    fn message_type(&self) -> MessageType {
        MessageType::TriggerFetchAndOpenDocument
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::UserDialog {
            title: "Failed to open document",
            body: "The file could not be reached over the internet. You may be offline, or it may be missing.",
        }
    }

    async fn handle(
        &self,
        ctx: &BridgeContext,
        message: FrontendMessage,
    ) -> Result<(), HandlerError> {
        let FrontendMessage::TriggerFetchAndOpenDocument { url } = message else {
            return Err(unexpected(self.message_type(), &message));
        };

        let url = Url::parse(&url).map_err(|e| HandlerError::InvalidUrl {
            url: redact_url(&url),
            reason: e.to_string(),
        })?;
        let filename = document_name(&url, &ctx.settings().fallback_document_name);
        let logged_url = redact_url(url.as_str());

        debug!(url = %logged_url, "Fetching document");
        let response = ctx
            .io(
                "fetch document",
                ctx.config().http_client.execute(HttpRequest::get(url.as_str())),
            )
            .await?;

        if !response.is_success() {
            return Err(HandlerError::HttpStatus {
                url: logged_url,
                status: response.status,
            });
        }

        let content = response.text()?;
        info!(url = %logged_url, %filename, "Opening fetched document");
        ctx.notify_editor("open_document_file", |editor| {
            editor.open_document_file(&filename, &content)
        });
        Ok(())
    }
}

pub struct OpenDocumentHandler;

#[async_trait]
impl MessageHandler for OpenDocumentHandler {
    fn message_type(&self) -> MessageType {
        MessageType::TriggerOpenDocument
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::UserDialog {
            title: "Failed to open document",
            body: "The selected file could not be read.",
        }
    }

    async fn handle(
        &self,
        ctx: &BridgeContext,
        message: FrontendMessage,
    ) -> Result<(), HandlerError> {
        let FrontendMessage::TriggerOpenDocument = message else {
            return Err(unexpected(self.message_type(), &message));
        };

        let suffix = ctx.editor().file_save_suffix();
        let file = ctx
            .io(
                "pick document",
                ctx.config()
                    .file_uploader
                    .upload(AcceptFilter::extension(&suffix), ReadMode::Text),
            )
            .await?;

        let filename = file.filename;
        let content = file.content.into_text()?;
        info!(%filename, "Opening local document");
        ctx.notify_editor("open_document_file", |editor| {
            editor.open_document_file(&filename, &content)
        });
        Ok(())
    }
}

pub struct ImportHandler;

#[async_trait]
impl MessageHandler for ImportHandler {
    fn message_type(&self) -> MessageType {
        MessageType::TriggerImport
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::UserDialog {
            title: "Failed to import image",
            body: "The selected file could not be decoded as an image.",
        }
    }

    async fn handle(
        &self,
        ctx: &BridgeContext,
        message: FrontendMessage,
    ) -> Result<(), HandlerError> {
        let FrontendMessage::TriggerImport = message else {
            return Err(unexpected(self.message_type(), &message));
        };

        let file = ctx
            .io(
                "pick image",
                ctx.config()
                    .file_uploader
                    .upload(AcceptFilter::mime("image/*"), ReadMode::Binary),
            )
            .await?;

        debug!(filename = %file.filename, mime = %file.mime, "Importing image");
        let blob = Blob::new(file.content.into_bytes(), file.mime);
        let pixels = ctx
            .io(
                "extract pixel data",
                ctx.config().image_codec.extract_pixel_data(blob),
            )
            .await?;

        ctx.notify_editor("paste_image", |editor| {
            editor.paste_image(&pixels.data, pixels.width, pixels.height)
        });
        Ok(())
    }
}
