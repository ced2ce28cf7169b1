//! Wire types for the conversation store API
//!
//! These mirror the JSON shapes served by the backend CRUD API. The core
//! holds a read-through cached copy of the active conversation only; the
//! server copy is canonical and reconciliation always re-reads it rather
//! than merging local deltas.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::providers::{ProviderFamily, ProviderSetting, SlotId};

/// Role of a message within a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Sent by the user; fanned out to every enabled slot
    User,
    /// Produced by a provider in response to a user turn
    Assistant,
    /// Per-slot failure rendered in the panel; never fans out
    Error,
}

/// One message in a conversation's append-only history
///
/// Immutable once created. The `provider` tag is written by this crate at
/// send time and is the authoritative slot attribution; `model` keyword
/// matching is a fallback for rows that predate tagging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Server-assigned id; `None` for messages not yet persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Message role
    pub role: MessageRole,
    /// Message body
    pub content: String,
    /// Model that produced the message (`None` for user messages)
    #[serde(default)]
    pub model: Option<String>,
    /// Provider family tag persisted at write time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderFamily>,
    /// Server-side creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    /// User message as it appears in canonical history
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: None,
            role: MessageRole::User,
            content: content.into(),
            model: None,
            provider: None,
            timestamp: None,
        }
    }

    /// Assistant message attributed to a provider family
    pub fn assistant(
        content: impl Into<String>,
        model: impl Into<String>,
        provider: ProviderFamily,
    ) -> Self {
        Self {
            id: None,
            role: MessageRole::Assistant,
            content: content.into(),
            model: Some(model.into()),
            provider: Some(provider),
            timestamp: None,
        }
    }

    /// Error bubble scoped to one provider's panel
    pub fn error(detail: impl Into<String>, provider: ProviderFamily) -> Self {
        Self {
            id: None,
            role: MessageRole::Error,
            content: detail.into(),
            model: None,
            provider: Some(provider),
            timestamp: None,
        }
    }

    /// Resolve the provider family this message belongs to
    ///
    /// Explicit tag first, model-keyword fallback second. `None` means the
    /// message cannot be attributed and is dropped from panel views.
    pub fn resolve_family(&self) -> Option<ProviderFamily> {
        self.provider
            .or_else(|| self.model.as_deref().and_then(ProviderFamily::from_model))
    }
}

/// Reference document attached to a conversation
///
/// Produced externally by upload; read-only to the core and concatenated
/// verbatim into the shared dispatch context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Server-assigned id
    pub id: String,
    /// Original filename
    pub filename: String,
    /// Extracted text content
    pub content: String,
    /// File type reported by the parser (e.g. "pdf", "txt")
    #[serde(default)]
    pub file_type: Option<String>,
}

/// Summary row returned by the conversation listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Conversation id
    pub id: i64,
    /// User-visible title
    pub title: String,
    /// Creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Full conversation as served by `GET /conversations/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Conversation id
    pub id: i64,
    /// User-visible title
    pub title: String,
    /// Shared system prompt applied to every slot
    #[serde(default)]
    pub system_prompt: String,
    /// Attached reference documents
    #[serde(default)]
    pub documents: Vec<Document>,
    /// Per-slot enabled/model snapshot (convenience cache)
    #[serde(default)]
    pub provider_settings: BTreeMap<SlotId, ProviderSetting>,
    /// Append-only message history
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial update body for `PATCH /conversations/{id}`
///
/// Fields are independent; only `Some` fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationPatch {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New system prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Replacement document list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<Document>>,
    /// Replacement provider settings snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_settings: Option<BTreeMap<SlotId, ProviderSetting>>,
}

/// Body of `POST /conversations/{id}/messages`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// User message text
    pub message: String,
    /// Target provider (`ProviderFamily::api_id`)
    pub provider: String,
    /// Shared context: system prompt plus concatenated documents
    #[serde(default)]
    pub system_prompt: String,
    /// Model override for this request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// When true the server must not persist the user message again
    ///
    /// Exactly one request per dispatch cycle (the primary) sends `false`;
    /// the siblings send `true` to avoid duplicate user rows.
    #[serde(default)]
    pub skip_user_message: bool,
}

/// Response of `POST /conversations/{id}/messages`
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageResponse {
    /// Persisted user message; `None` when `skip_user_message` was set
    #[serde(default)]
    pub user_message: Option<Message>,
    /// Persisted assistant reply
    pub assistant_message: Message,
}

/// Error body returned by the store on failure
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    /// Human-readable failure description
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&MessageRole::User).unwrap(), "\"user\"");
        let role: MessageRole = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(role, MessageRole::Assistant);
    }

    #[test]
    fn test_resolve_family_prefers_tag() {
        // Tag wins even when the model string points elsewhere
        let mut msg = Message::assistant("hi", "gpt-4o", ProviderFamily::Claude);
        assert_eq!(msg.resolve_family(), Some(ProviderFamily::Claude));

        msg.provider = None;
        assert_eq!(msg.resolve_family(), Some(ProviderFamily::OpenAi));
    }

    #[test]
    fn test_resolve_family_unknown_model() {
        let msg = Message {
            id: Some(7),
            role: MessageRole::Assistant,
            content: "hi".to_string(),
            model: Some("mystery-model".to_string()),
            provider: None,
            timestamp: None,
        };
        assert_eq!(msg.resolve_family(), None);
    }

    #[test]
    fn test_conversation_deserializes_without_optional_fields() {
        let json = r#"{"id": 3, "title": "Test"}"#;
        let conv: Conversation = serde_json::from_str(json).unwrap();
        assert_eq!(conv.id, 3);
        assert!(conv.messages.is_empty());
        assert!(conv.provider_settings.is_empty());
        assert_eq!(conv.system_prompt, "");
    }

    #[test]
    fn test_patch_skips_absent_fields() {
        let patch = ConversationPatch {
            system_prompt: Some("be brief".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"system_prompt":"be brief"}"#);
    }

    #[test]
    fn test_send_message_response_allows_skipped_user_message() {
        let json = r#"{
            "user_message": null,
            "assistant_message": {"role": "assistant", "content": "4", "model": "grok-4", "provider": "grok"}
        }"#;
        let resp: SendMessageResponse = serde_json::from_str(json).unwrap();
        assert!(resp.user_message.is_none());
        assert_eq!(resp.assistant_message.provider, Some(ProviderFamily::Grok));
    }
}
