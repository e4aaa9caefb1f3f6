//! # redpost-core
//!
//! Core types for the redpost publishing tool.
//!
//! Redpost drives a real browser against a creator platform and uses
//! chat-completion APIs to produce post text. This crate holds what every
//! other crate agrees on:
//!
//! - The unified [`RedpostError`] type and its [`Result`] alias
//! - [`GeneratedPost`], the three-field record every content provider returns
//! - [`RedpostConfig`], file-based settings with sensible defaults
//!
//! ## Error philosophy
//!
//! Two policies coexist and are kept explicit rather than inferred from
//! call-site shape:
//!
//! - Content generation **degrades to a placeholder**: a provider always
//!   returns a well-formed [`GeneratedPost`], never an error.
//! - Workflow steps **abort the pipeline** (fatal) or **warn and continue**
//!   (soft); the variants of [`RedpostError`] carry the fatal side.

mod config;
mod error;
mod types;

pub use config::{RedpostConfig, ResolverConfig, TimeoutConfig};
pub use error::{RedpostError, Result};
pub use types::GeneratedPost;
