//! # Message Dispatcher
//!
//! Routes engine messages to their handlers.
//!
//! ## Overview
//!
//! The dispatcher owns one handler per [`MessageType`]. [`Dispatcher::register`]
//! subscribes to every message kind on the engine; the callbacks push into a
//! single ordered inbox which [`Dispatcher::run`] drains.
//!
//! ```text
//! engine ──callback──▶ inbox (mpsc) ──run──▶ dispatch ──▶ inline handler
//!                                                    └──▶ TaskTracker ──▶ spawned handler
//! ```
//!
//! Inline handlers finish before `dispatch` returns, so store updates keep the
//! engine's emission order. Spawned handlers complete in any order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, warn};

use crate::context::BridgeContext;
use crate::error::{PortfolioError, Result};
use crate::handlers::{handler_for, ExecutionMode, MessageHandler};
use crate::messages::{FrontendMessage, MessageType};

/// Callback the engine invokes for each emitted message.
pub type MessageCallback = Box<dyn Fn(FrontendMessage) + Send + Sync>;

/// The engine's subscription facility.
pub trait MessageSubscriptions {
    fn subscribe_message(&self, message_type: MessageType, callback: MessageCallback);
}

pub struct Dispatcher {
    context: BridgeContext,
    handlers: HashMap<MessageType, Arc<dyn MessageHandler>>,
    tracker: TaskTracker,
    /// Held across close/wait/reopen of `tracker`.
    idle_waiter: tokio::sync::Mutex<()>,
    inbox_tx: Mutex<Option<mpsc::UnboundedSender<FrontendMessage>>>,
    inbox_rx: Mutex<Option<mpsc::UnboundedReceiver<FrontendMessage>>>,
}

impl Dispatcher {
    pub fn new(context: BridgeContext) -> Self {
        let handlers = MessageType::ALL
            .into_iter()
            .map(|message_type| (message_type, handler_for(message_type)))
            .collect();
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            context,
            handlers,
            tracker: TaskTracker::new(),
            idle_waiter: tokio::sync::Mutex::new(()),
            inbox_tx: Mutex::new(Some(tx)),
            inbox_rx: Mutex::new(Some(rx)),
        }
    }

    pub fn context(&self) -> &BridgeContext {
        &self.context
    }

    /// Subscribe every handler with the engine.
    ///
    /// # Errors
    ///
    /// Returns [`PortfolioError::AlreadyRegistered`] on a second call.
    pub fn register(&self, subscriptions: &dyn MessageSubscriptions) -> Result<()> {
        let sender = self
            .inbox_tx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
            .ok_or(PortfolioError::AlreadyRegistered)?;

        for message_type in MessageType::ALL {
            let sender = sender.clone();
            subscriptions.subscribe_message(
                message_type,
                Box::new(move |message| {
                    if sender.send(message).is_err() {
                        warn!(%message_type, "Dispatcher stopped, dropping message");
                    }
                }),
            );
        }

        debug!(count = MessageType::ALL.len(), "Registered message handlers");
        Ok(())
    }

    /// Dispatch inbox messages in arrival order.
    ///
    /// Returns once every engine callback has been dropped and the inbox is
    /// empty. Only the first call drains the inbox.
    pub async fn run(&self) {
        let receiver = self
            .inbox_rx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        let Some(mut receiver) = receiver else {
            warn!("Dispatcher inbox is already being drained");
            return;
        };

        while let Some(message) = receiver.recv().await {
            self.dispatch(message).await;
        }
        debug!("Dispatcher inbox closed");
    }

    /// Route one message to its handler.
    pub async fn dispatch(&self, message: FrontendMessage) {
        let message_type = message.message_type();
        let Some(handler) = self.handlers.get(&message_type) else {
            error!(%message_type, "No handler for message");
            return;
        };

        debug!(%message_type, "Dispatching message");
        match handler.execution_mode() {
            ExecutionMode::Inline => handler.run(&self.context, message).await,
            ExecutionMode::Spawned => {
                let handler = Arc::clone(handler);
                let context = self.context.clone();
                self.tracker.spawn(async move {
                    handler.run(&context, message).await;
                });
            }
        }
    }

    /// Number of spawned handlers still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait for every spawned handler to finish.
    ///
    /// Concurrent callers take turns, so one waiter never reopens the tracker
    /// while another is still waiting on it.
    pub async fn wait_idle(&self) {
        let _turn = self.idle_waiter.lock().await;
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}
