//! Shared helpers for the CLI commands.
//!
//! - [`logging`]: tracing subscriber and color control
//! - [`settings`]: configuration loading and the visitor's starting address

pub mod logging;
pub mod settings;
