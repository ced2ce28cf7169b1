//! Chat session
//!
//! `ChatSession` is the public surface exposed to the rendering layer. It
//! owns the provider registry and a read-through cached copy of the active
//! conversation, talks to the store through the [`ConversationStore`] seam,
//! and emits [`PanelEvent`]s for everything a front-end needs to draw.
//!
//! Shared-state policy: the active conversation is mutated by user edits,
//! settings toggles, and post-dispatch reconciliation. No locking is used;
//! settings are persisted immediately on each discrete toggle
//! (last-writer-wins) and reconciliation always re-reads canonical state
//! instead of merging local deltas.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{QuadChatError, Result};
use crate::providers::{ProviderRegistry, SlotId};
use crate::session::alerts::{spawn_aggregator, AggregatorHandle};
use crate::session::context::build_context;
use crate::session::dispatch::{fan_out, plan_requests};
use crate::session::events::EventSink;
use crate::session::reconcile::{project_panels, PanelSet};
use crate::store::{
    Conversation, ConversationPatch, ConversationSummary, ConversationStore, Document,
};

/// Session context tying the registry, store, and dispatch engine together
///
/// One instance per user session; everything the four components used to
/// share as globals lives here and is passed down explicitly.
pub struct ChatSession {
    store: Arc<dyn ConversationStore>,
    registry: ProviderRegistry,
    conversation: Option<Conversation>,
    events: EventSink,
    alerts: AggregatorHandle,
}

impl ChatSession {
    /// Create a session over a store client
    ///
    /// Spawns the alert aggregator task with the given quiet window.
    pub fn new(
        store: Arc<dyn ConversationStore>,
        registry: ProviderRegistry,
        alert_window: Duration,
        events: EventSink,
    ) -> Self {
        let alerts = spawn_aggregator(alert_window, events.clone());
        Self {
            store,
            registry,
            conversation: None,
            events,
            alerts,
        }
    }

    /// Borrow the provider registry
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Borrow the cached active conversation, if one is selected
    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    /// List conversations from the store
    pub async fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
        self.store.list_conversations().await
    }

    /// Create a conversation and make it active
    ///
    /// The current provider settings snapshot is persisted to the new
    /// conversation so it reopens with the same panel layout.
    pub async fn new_conversation(&mut self, title: &str) -> Result<i64> {
        let conversation = self.store.create_conversation(title).await?;
        let id = conversation.id;
        self.conversation = Some(conversation);
        self.persist_settings();
        Ok(id)
    }

    /// Fetch a conversation and make it active
    ///
    /// Provider settings stored with the conversation are applied to the
    /// registry when present.
    pub async fn select_conversation(&mut self, id: i64) -> Result<()> {
        let conversation = self.store.get_conversation(id).await?;
        if !conversation.provider_settings.is_empty() {
            self.registry.apply_settings(&conversation.provider_settings);
        }
        self.conversation = Some(conversation);
        Ok(())
    }

    /// Delete a conversation, clearing the active cache if it matches
    pub async fn delete_conversation(&mut self, id: i64) -> Result<()> {
        self.store.delete_conversation(id).await?;
        if self.conversation.as_ref().map(|c| c.id) == Some(id) {
            self.conversation = None;
        }
        Ok(())
    }

    /// Toggle a slot's enabled state, returning the new state
    ///
    /// The last enabled slot may be toggled off; dispatch refuses an empty
    /// set at send time instead.
    pub fn toggle_provider(&mut self, slot: SlotId) -> bool {
        let enabled = self.registry.toggle(slot);
        self.persist_settings();
        enabled
    }

    /// Select a model for a slot
    pub fn set_model(&mut self, slot: SlotId, model: impl Into<String>) {
        self.registry.set_model(slot, model);
        self.persist_settings();
    }

    /// Update the shared system prompt on the active conversation
    pub async fn set_system_prompt(&mut self, prompt: &str) -> Result<()> {
        let conversation = self.active_mut()?;
        conversation.system_prompt = prompt.to_string();
        let id = conversation.id;
        let patch = ConversationPatch {
            system_prompt: Some(prompt.to_string()),
            ..Default::default()
        };
        self.store.update_conversation(id, &patch).await?;
        Ok(())
    }

    /// Upload a document and attach it to the active conversation
    pub async fn upload_document(&mut self, filename: &str, bytes: Vec<u8>) -> Result<Document> {
        let document = self.store.upload_document(filename, bytes).await?;
        self.attach_document(document.clone()).await?;
        Ok(document)
    }

    /// Attach an already uploaded document to the active conversation
    pub async fn attach_document(&mut self, document: Document) -> Result<()> {
        let conversation = self.active_mut()?;
        conversation.documents.push(document);
        let id = conversation.id;
        let documents = conversation.documents.clone();
        let patch = ConversationPatch {
            documents: Some(documents),
            ..Default::default()
        };
        self.store.update_conversation(id, &patch).await?;
        Ok(())
    }

    /// Run one dispatch cycle for a user message
    ///
    /// Fails fast with `NoProvidersEnabled` before any network call when
    /// the enabled set is empty. Otherwise fans the message out to every
    /// enabled slot, waits for all requests to settle (per-slot failures
    /// are captured, never short-circuit the join), then reconciles the
    /// cached message list against the canonical conversation.
    ///
    /// Precondition: the caller must not re-invoke dispatch while a prior
    /// cycle for this session is in flight.
    pub async fn dispatch(&mut self, message: &str) -> Result<()> {
        let conversation = self
            .conversation
            .as_ref()
            .ok_or_else(|| QuadChatError::ConversationLoad("no active conversation".to_string()))?;
        let conversation_id = conversation.id;

        // Building: context is computed once and frozen for the cycle
        let context: Arc<str> =
            Arc::from(build_context(&conversation.system_prompt, &conversation.documents));
        let requests = plan_requests(&self.registry, message, context)?;

        tracing::info!(
            conversation = conversation_id,
            requests = requests.len(),
            "dispatch cycle starting"
        );

        // InFlight: all requests issued before any is awaited
        let outcomes = fan_out(
            self.store.as_ref(),
            conversation_id,
            requests,
            &self.events,
            &self.alerts,
        )
        .await;

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        tracing::info!(
            conversation = conversation_id,
            settled = outcomes.len(),
            failed,
            "dispatch cycle settled"
        );

        // Reconciling: replace cached messages with server truth
        self.refresh_messages(conversation_id).await?;
        Ok(())
    }

    /// Re-fetch canonical history and rebuild per-slot panel contents
    ///
    /// Idempotent: calling twice with no intervening message creation
    /// yields identical panels.
    pub async fn reconcile(&mut self, id: i64) -> Result<PanelSet> {
        self.refresh_messages(id).await?;
        Ok(self.panels())
    }

    /// Project panels from the cached conversation
    pub fn panels(&self) -> PanelSet {
        self.conversation
            .as_ref()
            .map(|c| project_panels(&c.messages, &self.registry))
            .unwrap_or_default()
    }

    /// Replace the cached message list with the server's canonical copy
    ///
    /// Provider settings are deliberately not reloaded here: the user may
    /// have toggled slots while requests were in flight, and those toggles
    /// were already persisted individually.
    async fn refresh_messages(&mut self, id: i64) -> Result<()> {
        let canonical = self.store.get_conversation(id).await?;
        match self.conversation.as_mut() {
            Some(cached) if cached.id == id => {
                cached.messages = canonical.messages;
                cached.system_prompt = canonical.system_prompt;
                cached.documents = canonical.documents;
                cached.updated_at = canonical.updated_at;
            }
            _ => self.conversation = Some(canonical),
        }
        Ok(())
    }

    /// Persist the registry snapshot to the active conversation
    ///
    /// Fire-and-forget: the snapshot is a convenience cache, so failure is
    /// logged and never surfaced.
    fn persist_settings(&self) {
        let Some(conversation) = self.conversation.as_ref() else {
            return;
        };
        let id = conversation.id;
        let snapshot = self.registry.snapshot();
        let store = self.store.clone();
        tokio::spawn(async move {
            let patch = ConversationPatch {
                provider_settings: Some(snapshot),
                ..Default::default()
            };
            if let Err(error) = store.update_conversation(id, &patch).await {
                tracing::warn!(conversation = id, "failed to persist provider settings: {}", error);
            }
        });
    }

    fn active_mut(&mut self) -> Result<&mut Conversation> {
        self.conversation
            .as_mut()
            .ok_or_else(|| QuadChatError::ConversationLoad("no active conversation".to_string()).into())
    }
}
