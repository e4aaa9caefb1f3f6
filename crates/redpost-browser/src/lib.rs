//! Browser session, element resolver, and publish workflow for redpost
//!
//! This crate drives a persistent Chrome profile over Chrome DevTools
//! Protocol (CDP) and sequences the publish pipeline against the creator
//! platform's UI.
//!
//! # Features
//!
//! - **Session Management**: launch a browser bound to a persistent
//!   profile directory, with anti-automation-detection tweaks applied
//! - **Element Resolution**: translate natural-language element
//!   descriptions into CSS selectors via a remote inference service, with
//!   markup simplification and a hard size cap
//! - **Publish Workflow**: a strict forward state machine with declared
//!   fallback selectors, named postconditions, and explicit failure
//!   policies per step
//!
//! # Example
//!
//! ```no_run
//! use redpost_browser::session::{Session, SessionConfig};
//! use redpost_browser::resolver::{ChatSelectorInference, ElementResolver};
//! use redpost_browser::workflow::PublishWorkflow;
//! use redpost_content::{deepseek_api_key, ChatClient};
//! use redpost_core::{GeneratedPost, RedpostConfig};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RedpostConfig::default();
//!     let session = Session::launch(SessionConfig::default()).await?;
//!
//!     let client = ChatClient::new(deepseek_api_key()?, "https://api.deepseek.com/v1", "deepseek-chat");
//!     let resolver = ElementResolver::new(Box::new(ChatSelectorInference::new(client)));
//!
//!     let workflow = PublishWorkflow::new(&session, resolver, config);
//!     let post = GeneratedPost {
//!         title: "Title".into(),
//!         content: "Body #tag".into(),
//!         image_prompt: "cover".into(),
//!     };
//!     let report = workflow.publish(&post, Path::new("image.jpg")).await?;
//!     println!("submit clicked: {}", report.submit_clicked);
//!
//!     session.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Requirements
//!
//! - Chrome or Chromium installed
//! - A profile directory writable by the current user
//!
//! # Architecture
//!
//! - [`session`]: browser lifecycle bound to a persistent profile
//! - [`driver`]: the page-operation trait the workflow runs against
//! - [`markup`]: DOM simplification and truncation for the resolver
//! - [`resolver`]: AI-assisted selector lookup with explicit failures
//! - [`workflow`]: the publish state machine
//! - [`error`]: re-exported unified error types

pub mod driver;
pub mod error;
pub mod markup;
pub mod resolver;
pub mod session;
pub mod workflow;

// Re-export commonly used types
pub use driver::PageDriver;
pub use error::{RedpostError, Result};
pub use markup::{simplify_markup, truncate_markup, MAX_MARKUP_LEN, TRUNCATION_MARKER};
pub use resolver::{
    ChatSelectorInference, ElementHandle, ElementResolver, OfflineInference, SelectorInference,
};
pub use session::{Session, SessionConfig};
pub use workflow::{
    Confirmation, FailurePolicy, PublishReport, PublishWorkflow, ResolutionOrder, StepOutcome,
    StepSpec, WorkflowStep,
};
