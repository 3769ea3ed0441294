//! # Message Handlers
//!
//! One handler per [`MessageType`]. Each handler performs its host I/O,
//! reports results back to the engine and resolves its own failures.
//!
//! ## Failure policies
//!
//! | Policy | Effect |
//! |---|---|
//! | `UserDialog` | Error dialog shown through the engine, warning logged |
//! | `SilentDrop` | Trace log only |
//! | `DiagnosticLog` | Error logged with the message type and cause |
//!
//! User cancellation of a host dialog is resolved by
//! [`UploadCancelPolicy`](core_runtime::UploadCancelPolicy) before the
//! handler's own policy applies.

mod documents;
mod download;
mod images;
mod open;

pub use documents::{UpdateActiveDocumentHandler, UpdateOpenDocumentsListHandler};
pub use download::{
    CopyToClipboardBlobUrlHandler, DownloadBlobUrlHandler, DownloadRasterHandler,
    DownloadTextFileHandler,
};
pub use images::{RasterizeRegionBelowLayerHandler, RevokeBlobUrlHandler, UpdateImageDataHandler};
pub use open::{FetchAndOpenDocumentHandler, ImportHandler, OpenDocumentHandler};

use async_trait::async_trait;
use core_runtime::UploadCancelPolicy;
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

use crate::context::BridgeContext;
use crate::error::HandlerError;
use crate::messages::{FrontendMessage, MessageType};

/// How a handler's failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    UserDialog {
        title: &'static str,
        body: &'static str,
    },
    SilentDrop,
    DiagnosticLog,
}

/// Where a handler runs relative to the dispatch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Completes before `dispatch` returns; keeps store updates in emission order.
    Inline,
    /// Runs as a tracked task; completion order is unspecified.
    Spawned,
}

#[async_trait]
pub trait MessageHandler: Send + Sync {
    fn message_type(&self) -> MessageType;

    fn failure_policy(&self) -> FailurePolicy;

    fn execution_mode(&self) -> ExecutionMode {
        ExecutionMode::Spawned
    }

    async fn handle(&self, ctx: &BridgeContext, message: FrontendMessage)
        -> Result<(), HandlerError>;

    /// Handle `message` and resolve any failure through the handler's policy.
    async fn run(&self, ctx: &BridgeContext, message: FrontendMessage) {
        let message_type = self.message_type();
        match self.handle(ctx, message).await {
            Ok(()) => trace!(%message_type, "Message handled"),
            Err(err) => apply_failure_policy(ctx, message_type, self.failure_policy(), &err),
        }
    }
}

fn apply_failure_policy(
    ctx: &BridgeContext,
    message_type: MessageType,
    policy: FailurePolicy,
    err: &HandlerError,
) {
    let policy = if err.is_cancelled() {
        match ctx.settings().upload_cancel_policy {
            UploadCancelPolicy::Silent => {
                debug!(%message_type, "Dialog dismissed by the user");
                return;
            }
            UploadCancelPolicy::ErrorDialog => policy,
        }
    } else {
        policy
    };

    match policy {
        FailurePolicy::UserDialog { title, body } => {
            warn!(%message_type, error = %err, "Handler failed, showing error dialog");
            ctx.notify_editor("error_dialog", |editor| editor.error_dialog(title, body));
        }
        FailurePolicy::SilentDrop => {
            trace!(%message_type, error = %err, "Handler failed silently");
        }
        FailurePolicy::DiagnosticLog => {
            error!(%message_type, error = %err, "Handler failed");
        }
    }
}

/// Build the handler for `message_type`.
///
/// The match is exhaustive so every message kind has exactly one handler.
pub fn handler_for(message_type: MessageType) -> Arc<dyn MessageHandler> {
    match message_type {
        MessageType::UpdateOpenDocumentsList => Arc::new(UpdateOpenDocumentsListHandler),
        MessageType::UpdateActiveDocument => Arc::new(UpdateActiveDocumentHandler),
        MessageType::TriggerFetchAndOpenDocument => Arc::new(FetchAndOpenDocumentHandler),
        MessageType::TriggerOpenDocument => Arc::new(OpenDocumentHandler),
        MessageType::TriggerImport => Arc::new(ImportHandler),
        MessageType::TriggerDownloadTextFile => Arc::new(DownloadTextFileHandler),
        MessageType::TriggerDownloadBlobUrl => Arc::new(DownloadBlobUrlHandler),
        MessageType::TriggerCopyToClipboardBlobUrl => Arc::new(CopyToClipboardBlobUrlHandler),
        MessageType::TriggerDownloadRaster => Arc::new(DownloadRasterHandler),
        MessageType::UpdateImageData => Arc::new(UpdateImageDataHandler),
        MessageType::TriggerRasterizeRegionBelowLayer => {
            Arc::new(RasterizeRegionBelowLayerHandler)
        }
        MessageType::TriggerRevokeBlobUrl => Arc::new(RevokeBlobUrlHandler),
    }
}

pub(crate) fn unexpected(expected: MessageType, message: &FrontendMessage) -> HandlerError {
    HandlerError::UnexpectedMessage {
        expected,
        received: message.message_type(),
    }
}
