//! QuadChat - multi-provider concurrent chat dispatch library
//!
//! This library implements the engine behind a four-panel LLM comparison
//! tool: one user prompt fans out concurrently to every enabled provider
//! slot, per-slot lifecycle is tracked through typed events, canonical
//! conversation history is reconciled into per-panel views, and repeated
//! configuration errors coalesce into a single debounced alert.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: dispatch engine, panel reconciliation, alert aggregation,
//!   and the `ChatSession` surface the UI layer drives
//! - `providers`: provider family identity and the four-slot registry
//! - `store`: conversation store client (HTTP CRUD) and wire types
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use quadchat::providers::ProviderRegistry;
//! use quadchat::session::{event_channel, ChatSession, DEFAULT_ALERT_WINDOW};
//! use quadchat::store::HttpConversationStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(HttpConversationStore::new("http://localhost:8000/api")?);
//!     let (events, _stream) = event_channel();
//!     let mut session = ChatSession::new(
//!         store,
//!         ProviderRegistry::default(),
//!         DEFAULT_ALERT_WINDOW,
//!         events,
//!     );
//!     session.new_conversation("Comparison").await?;
//!     session.dispatch("Explain recursion").await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod providers;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use error::{QuadChatError, Result};
pub use providers::{ProviderFamily, ProviderRegistry, SlotId};
pub use session::{ChatSession, PanelEvent, PanelSet};
pub use store::{Conversation, HttpConversationStore, Message, MessageRole};
