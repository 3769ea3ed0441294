//! Shared state handed to every message handler.

use bridge_traits::{error::Result as BridgeResult, EditorInstance};
use core_runtime::{BridgeConfig, BridgeSettings};
use std::future::Future;
use std::sync::Arc;
use tracing::error;

use crate::error::HandlerError;
use crate::store::PortfolioStore;

/// Host adapters, engine handle and store for one bridge session.
///
/// Cheap to clone; handlers that fan out clone it into their tasks.
#[derive(Clone)]
pub struct BridgeContext {
    config: BridgeConfig,
    editor: Arc<dyn EditorInstance>,
    store: PortfolioStore,
}

impl BridgeContext {
    pub fn new(config: BridgeConfig, editor: Arc<dyn EditorInstance>, store: PortfolioStore) -> Self {
        Self {
            config,
            editor,
            store,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.config.settings
    }

    pub fn editor(&self) -> &dyn EditorInstance {
        self.editor.as_ref()
    }

    pub fn store(&self) -> &PortfolioStore {
        &self.store
    }

    /// Await a host I/O call, applying the configured deadline.
    pub async fn io<T, F>(&self, operation: &'static str, call: F) -> Result<T, HandlerError>
    where
        F: Future<Output = BridgeResult<T>>,
    {
        match self.settings().io_timeout {
            Some(timeout) => tokio::time::timeout(timeout, call)
                .await
                .map_err(|_| HandlerError::TimedOut { operation, timeout })?
                .map_err(HandlerError::from),
            None => call.await.map_err(HandlerError::from),
        }
    }

    /// Call into the engine, logging a rejected call instead of failing.
    pub fn notify_editor<F>(&self, operation: &'static str, call: F)
    where
        F: FnOnce(&dyn EditorInstance) -> BridgeResult<()>,
    {
        if let Err(err) = call(self.editor()) {
            error!(operation, error = %err, "Engine rejected callback");
        }
    }
}
