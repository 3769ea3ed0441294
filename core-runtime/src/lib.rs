//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the editor bridge:
//! - Logging and tracing infrastructure
//! - Configuration management with host adapter injection
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the message handlers depend
//! on. It resolves the host adapters (falling back to desktop implementations
//! when the `desktop-shims` feature is enabled) and establishes the logging
//! conventions used throughout the workspace.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{BridgeConfig, BridgeConfigBuilder, BridgeSettings, UploadCancelPolicy};
pub use error::{Error, Result};
