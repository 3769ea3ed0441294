//! Store updates mirroring the engine's document list.

use async_trait::async_trait;
use tracing::debug;

use super::{unexpected, ExecutionMode, FailurePolicy, MessageHandler};
use crate::context::BridgeContext;
use crate::error::HandlerError;
use crate::messages::{FrontendMessage, MessageType};

pub struct UpdateOpenDocumentsListHandler;

#[async_trait]
impl MessageHandler for UpdateOpenDocumentsListHandler {
    fn message_type(&self) -> MessageType {
        MessageType::UpdateOpenDocumentsList
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
        let FrontendMessage::UpdateOpenDocumentsList { open_documents } = message else {
            return Err(unexpected(self.message_type(), &message));
        };

        debug!(count = open_documents.len(), "Open documents updated");
        ctx.store().replace_documents(open_documents);
        Ok(())
    }
}

pub struct UpdateActiveDocumentHandler;

#[async_trait]
impl MessageHandler for UpdateActiveDocumentHandler {
    fn message_type(&self) -> MessageType {
        MessageType::UpdateActiveDocument
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
        let FrontendMessage::UpdateActiveDocument { document_id } = message else {
            return Err(unexpected(self.message_type(), &message));
        };

        ctx.store().set_active_document(document_id);
        Ok(())
    }
}
