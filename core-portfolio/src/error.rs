use bridge_traits::BridgeError;
use std::time::Duration;
use thiserror::Error;

use crate::messages::MessageType;

#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("Message handlers are already registered with the engine")]
    AlreadyRegistered,

    #[error(transparent)]
    Runtime(#[from] core_runtime::Error),
}

pub type Result<T> = std::result::Result<T, PortfolioError>;

/// Failure of a single message handler.
///
/// Never escapes the dispatcher: each handler resolves it through its
/// failure policy.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request to {url} failed with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Host adapter error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Operation cancelled by the user")]
    Cancelled,

    #[error("{operation} timed out after {timeout:?}")]
    TimedOut {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Handler for {expected} received {received}")]
    UnexpectedMessage {
        expected: MessageType,
        received: MessageType,
    },

    #[error("{failed} of {total} image entries failed")]
    PartialFailure { failed: usize, total: usize },
}

impl HandlerError {
    /// True when the user dismissed a host dialog.
    pub fn is_cancelled(&self) -> bool {
        match self {
            HandlerError::Cancelled => true,
            HandlerError::Bridge(err) => err.is_cancelled(),
            _ => false,
        }
    }
}
