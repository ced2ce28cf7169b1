//! Conversation store client and wire types
//!
//! The persistence backend is an external collaborator reached over an HTTP
//! CRUD API. This module defines the wire types it serves and the client
//! trait the rest of the crate depends on.

pub mod client;
pub mod types;

pub use client::{ConversationStore, HttpConversationStore};
pub use types::{
    Conversation, ConversationPatch, ConversationSummary, Document, ErrorBody, Message,
    MessageRole, SendMessageRequest, SendMessageResponse,
};
