//! # Portfolio Bridge
//!
//! Connects the document engine to host I/O.
//!
//! ## Overview
//!
//! The engine emits [`FrontendMessage`]s ("open this URL as a document",
//! "rasterize this region"). The bridge performs the privileged host
//! operation through the adapters in [`BridgeConfig`] and reports results
//! back through [`EditorInstance`]. A reactive [`PortfolioStore`] mirrors
//! which documents are open and which one is active.
//!
//! ## Usage
//!
//! ```ignore
//! use core_portfolio::PortfolioBridge;
//! use core_runtime::BridgeConfig;
//! use std::sync::Arc;
//!
//! let bridge = PortfolioBridge::bootstrap(BridgeConfig::builder(), Arc::new(editor))?;
//! bridge.store().subscribe(|state| println!("{:?}", state.active_document()));
//! bridge.register(&engine_subscriptions)?;
//!
//! tokio::spawn(async move { bridge.run().await });
//! ```

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod messages;
pub mod store;

pub use context::BridgeContext;
pub use dispatcher::{Dispatcher, MessageCallback, MessageSubscriptions};
pub use error::{HandlerError, PortfolioError, Result};
pub use handlers::{ExecutionMode, FailurePolicy, MessageHandler};
pub use messages::{DocumentDetails, FrontendMessage, ImageDataEntry, MessageType, Size};
pub use store::{PortfolioState, PortfolioStore, Subscription};

use bridge_traits::EditorInstance;
use core_runtime::config::{BridgeConfig, BridgeConfigBuilder};
use std::sync::Arc;

/// Primary façade exposed to host applications.
pub struct PortfolioBridge {
    store: PortfolioStore,
    dispatcher: Dispatcher,
}

impl PortfolioBridge {
    /// Create a bridge from resolved adapters.
    pub fn new(config: BridgeConfig, editor: Arc<dyn EditorInstance>) -> Self {
        let store = PortfolioStore::new();
        let context = BridgeContext::new(config, editor, store.clone());
        Self {
            store,
            dispatcher: Dispatcher::new(context),
        }
    }

    /// Build the configuration and create a bridge from it.
    ///
    /// # Errors
    ///
    /// Fails when an adapter is missing or a setting is invalid.
    pub fn bootstrap(builder: BridgeConfigBuilder, editor: Arc<dyn EditorInstance>) -> Result<Self> {
        let config = builder.build()?;
        Ok(Self::new(config, editor))
    }

    pub fn store(&self) -> &PortfolioStore {
        &self.store
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Subscribe all handlers with the engine. Can only be called once.
    pub fn register(&self, subscriptions: &dyn MessageSubscriptions) -> Result<()> {
        self.dispatcher.register(subscriptions)
    }

    pub async fn dispatch(&self, message: FrontendMessage) {
        self.dispatcher.dispatch(message).await;
    }

    /// Drain engine messages until the engine drops its callbacks.
    pub async fn run(&self) {
        self.dispatcher.run().await;
    }

    pub async fn wait_idle(&self) {
        self.dispatcher.wait_idle().await;
    }
}
