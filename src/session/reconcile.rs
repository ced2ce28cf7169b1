//! Panel state reconciliation
//!
//! After a dispatch cycle, the canonical conversation history is re-fetched
//! and per-slot panel contents are rebuilt from scratch. The projection is
//! a mandatory two-pass walk: a user bubble belongs to a panel only if that
//! panel produced a reply to it, and a single pass cannot know whether a
//! panel will respond to a user turn it has not seen yet.

use std::collections::{BTreeMap, HashSet};

use crate::providers::{ProviderRegistry, SlotId};
use crate::store::{Message, MessageRole};

/// Per-slot panel contents derived from canonical history
///
/// Panels exist for all four slots; disabled slots project empty. The
/// projection is pure, so re-running it on the same input yields identical
/// panels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelSet {
    panels: BTreeMap<SlotId, Vec<Message>>,
}

impl PanelSet {
    /// Messages rendered in one slot's panel
    pub fn panel(&self, slot: SlotId) -> &[Message] {
        self.panels.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate (slot, messages) pairs in ascending slot order
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &[Message])> {
        self.panels.iter().map(|(slot, msgs)| (*slot, msgs.as_slice()))
    }

    /// True when no panel holds any message
    pub fn is_empty(&self) -> bool {
        self.panels.values().all(Vec::is_empty)
    }

    fn push(&mut self, slot: SlotId, message: Message) {
        self.panels.entry(slot).or_default().push(message);
    }
}

/// Rebuild per-slot panel contents from the canonical message list
///
/// Pass one records, per user-turn index, which slots produced an assistant
/// reply. Pass two places each message: user messages go only to the
/// enabled slots recorded as having responded to that turn; assistant and
/// error messages go to their resolved slot when enabled. Messages whose
/// slot cannot be resolved (unknown model, no provider tag) are dropped
/// from the panel view but remain in canonical history.
pub fn project_panels(messages: &[Message], registry: &ProviderRegistry) -> PanelSet {
    // Pass one: which (turn, slot) pairs have an assistant reply
    let mut responded: HashSet<(usize, SlotId)> = HashSet::new();
    let mut turn = 0usize;
    for message in messages {
        match message.role {
            MessageRole::User => turn += 1,
            // Only real replies claim a user bubble; an error bubble alone
            // does not pull the user message into its panel.
            MessageRole::Assistant => {
                if let Some(family) = message.resolve_family() {
                    responded.insert((turn, registry.slot_for_family(family)));
                }
            }
            MessageRole::Error => {}
        }
    }

    // Pass two: place each message now that turn membership is known
    let mut panels = PanelSet::default();
    let mut turn = 0usize;
    for message in messages {
        match message.role {
            MessageRole::User => {
                turn += 1;
                for slot in registry.enabled_slots() {
                    if responded.contains(&(turn, slot)) {
                        panels.push(slot, message.clone());
                    }
                }
            }
            MessageRole::Assistant | MessageRole::Error => {
                let Some(family) = message.resolve_family() else {
                    continue;
                };
                let slot = registry.slot_for_family(family);
                if registry.is_enabled(slot) {
                    panels.push(slot, message.clone());
                }
            }
        }
    }
    panels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderFamily;

    fn slot(id: u8) -> SlotId {
        SlotId::new(id).unwrap()
    }

    fn history_two_turns() -> Vec<Message> {
        vec![
            Message::user("Explain recursion"),
            Message::assistant("It calls itself.", "gpt-5.1", ProviderFamily::OpenAi),
            Message::assistant("Self-reference.", "gemini-2.5-pro", ProviderFamily::Gemini),
            Message::user("Shorter please"),
            Message::assistant("Self-call.", "gpt-5.1", ProviderFamily::OpenAi),
        ]
    }

    #[test]
    fn test_user_bubble_only_in_responding_panels() {
        let registry = ProviderRegistry::default();
        let panels = project_panels(&history_two_turns(), &registry);

        // Slot 1 (OpenAI) answered both turns
        let p1 = panels.panel(slot(1));
        assert_eq!(p1.len(), 4);
        assert_eq!(p1[0].role, MessageRole::User);
        assert_eq!(p1[2].content, "Shorter please");

        // Slot 3 (Gemini) answered only the first turn
        let p3 = panels.panel(slot(3));
        assert_eq!(p3.len(), 2);
        assert_eq!(p3[0].content, "Explain recursion");

        // Slots 2 and 4 never responded; no user bubbles either
        assert!(panels.panel(slot(2)).is_empty());
        assert!(panels.panel(slot(4)).is_empty());
    }

    #[test]
    fn test_projection_is_idempotent() {
        let registry = ProviderRegistry::default();
        let history = history_two_turns();
        let first = project_panels(&history, &registry);
        let second = project_panels(&history, &registry);
        assert_eq!(first, second);
    }

    #[test]
    fn test_disabled_slot_hides_without_deleting() {
        let mut registry = ProviderRegistry::default();
        let history = history_two_turns();

        registry.toggle(slot(1));
        let hidden = project_panels(&history, &registry);
        assert!(hidden.panel(slot(1)).is_empty());
        // Canonical history untouched
        assert_eq!(history.len(), 5);

        registry.toggle(slot(1));
        let restored = project_panels(&history, &registry);
        assert_eq!(restored.panel(slot(1)).len(), 4);
    }

    #[test]
    fn test_unresolvable_model_dropped_from_view() {
        let registry = ProviderRegistry::default();
        let history = vec![
            Message::user("hi"),
            Message {
                id: Some(2),
                role: MessageRole::Assistant,
                content: "hello".to_string(),
                model: Some("mystery-9000".to_string()),
                provider: None,
                timestamp: None,
            },
        ];
        let panels = project_panels(&history, &registry);
        assert!(panels.is_empty());
    }

    #[test]
    fn test_untagged_legacy_rows_resolve_by_model_keyword() {
        let registry = ProviderRegistry::default();
        let history = vec![
            Message::user("hi"),
            Message {
                id: Some(2),
                role: MessageRole::Assistant,
                content: "hello".to_string(),
                model: Some("claude-3-opus-20240229".to_string()),
                provider: None,
                timestamp: None,
            },
        ];
        let panels = project_panels(&history, &registry);
        assert_eq!(panels.panel(slot(2)).len(), 2);
    }

    #[test]
    fn test_error_messages_placed_in_their_panel() {
        let registry = ProviderRegistry::default();
        let history = vec![
            Message::user("hi"),
            Message::error("Grok API key not configured", ProviderFamily::Grok),
        ];
        let panels = project_panels(&history, &registry);
        // The error bubble lands in slot 4, but an error alone does not
        // claim the user bubble for that panel.
        let p4 = panels.panel(slot(4));
        assert_eq!(p4.len(), 1);
        assert_eq!(p4[0].role, MessageRole::Error);
    }
}
