//! Workspace umbrella crate.
//!
//! This crate exposes shared feature flags that map to the individual
//! workspace crates (`core-portfolio`, `core-runtime`). Host applications can
//! depend on `editor-bridge-workspace` and enable `desktop-shims` (default
//! adapters for macOS, Windows and Linux) or `portable` (every adapter must be
//! injected) without wiring each crate individually.

#[cfg(any(feature = "desktop-shims", feature = "portable"))]
pub use core_portfolio as portfolio;

#[cfg(any(feature = "desktop-shims", feature = "portable"))]
pub use core_runtime as runtime;
