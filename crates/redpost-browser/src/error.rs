//! Browser automation error types - re-exports the unified RedpostError
//!
//! Browser errors use the unified RedpostError type:
//! - Session(String) - launch/profile failures (fatal-setup)
//! - Browser(String) - navigation, waits, clicks, CDP failures
//! - Resolver(String) - AI-assisted selector lookup failures
//! - Step { step, message } - fatal workflow-step failures
//!
//! Error messages should be descriptive and include context about the
//! operation that failed.

pub use redpost_core::{RedpostError, Result};
