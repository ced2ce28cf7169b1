//! Provider slot registry
//!
//! Exactly four provider slots exist for the lifetime of a session, each
//! bound to a fixed provider family with a mutable enabled flag and model
//! selection. The registry owns the slots; the dispatch engine reads the
//! enabled set and the session layer persists settings snapshots to the
//! active conversation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::SlotConfig;
use crate::error::{QuadChatError, Result};
use crate::providers::ProviderFamily;

/// Identifier of one of the four fixed panel slots (1..=4)
///
/// The range check also guards deserialization, so an out-of-range id in a
/// persisted settings snapshot is rejected at decode time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct SlotId(u8);

impl SlotId {
    /// Construct a slot id, rejecting values outside 1..=4
    pub fn new(id: u8) -> Result<Self> {
        if (1..=4).contains(&id) {
            Ok(Self(id))
        } else {
            Err(QuadChatError::Config(format!("invalid slot id: {} (expected 1-4)", id)).into())
        }
    }

    /// Raw slot number (1-based)
    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for SlotId {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SlotId> for u8 {
    fn from(id: SlotId) -> Self {
        id.0
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Serialized enabled/model state for one slot
///
/// This is the shape attached to a conversation as `provider_settings`;
/// it is a convenience cache, not the source of slot identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSetting {
    /// Whether the slot participates in dispatch cycles
    pub enabled: bool,
    /// Currently selected model for the slot
    pub model: String,
}

/// One of the four fixed provider positions
#[derive(Debug, Clone)]
pub struct ProviderSlot {
    /// Slot position (1..=4)
    pub id: SlotId,
    /// Vendor identity; fixed for the life of the session
    pub family: ProviderFamily,
    /// Currently selected model
    pub model: String,
    /// Whether the slot participates in dispatch cycles
    pub enabled: bool,
}

/// Registry of the four provider slots
///
/// Slot identity (position and family) never changes; only `enabled` and
/// `model` mutate. Zero enabled slots is a legal state — the dispatch
/// engine refuses to send with an empty set, but nothing here forces the
/// last slot to stay on.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    slots: [ProviderSlot; 4],
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        let slots = ProviderFamily::ALL.map(|family| ProviderSlot {
            // ALL is indexed in slot order, so position+1 is always valid
            id: SlotId((family as u8) + 1),
            family,
            model: family.default_model().to_string(),
            enabled: true,
        });
        Self { slots }
    }
}

impl ProviderRegistry {
    /// Build a registry from per-family configuration defaults
    pub fn from_config(slots: &BTreeMap<ProviderFamily, SlotConfig>) -> Self {
        let mut registry = Self::default();
        for slot in registry.slots.iter_mut() {
            if let Some(cfg) = slots.get(&slot.family) {
                slot.enabled = cfg.enabled;
                if let Some(model) = &cfg.model {
                    slot.model = model.clone();
                }
            }
        }
        registry
    }

    /// Borrow all four slots in ascending slot order
    pub fn slots(&self) -> &[ProviderSlot; 4] {
        &self.slots
    }

    /// Borrow a single slot
    pub fn slot(&self, id: SlotId) -> &ProviderSlot {
        &self.slots[(id.0 - 1) as usize]
    }

    /// Flip the enabled state of a slot, returning the new state
    pub fn toggle(&mut self, id: SlotId) -> bool {
        let slot = &mut self.slots[(id.0 - 1) as usize];
        slot.enabled = !slot.enabled;
        slot.enabled
    }

    /// Select a model for a slot
    pub fn set_model(&mut self, id: SlotId, model: impl Into<String>) {
        self.slots[(id.0 - 1) as usize].model = model.into();
    }

    /// Whether a slot currently participates in dispatch
    pub fn is_enabled(&self, id: SlotId) -> bool {
        self.slot(id).enabled
    }

    /// Ids of all enabled slots, ascending
    ///
    /// The first entry (lowest slot id) becomes the primary request of a
    /// dispatch cycle.
    pub fn enabled_slots(&self) -> Vec<SlotId> {
        self.slots
            .iter()
            .filter(|s| s.enabled)
            .map(|s| s.id)
            .collect()
    }

    /// Slot bound to a provider family
    ///
    /// Families map 1:1 onto slots, so this always resolves.
    pub fn slot_for_family(&self, family: ProviderFamily) -> SlotId {
        self.slots
            .iter()
            .find(|s| s.family == family)
            .map(|s| s.id)
            .unwrap_or(SlotId(1))
    }

    /// Serialized enabled/model snapshot for persisting to a conversation
    pub fn snapshot(&self) -> BTreeMap<SlotId, ProviderSetting> {
        self.slots
            .iter()
            .map(|s| {
                (
                    s.id,
                    ProviderSetting {
                        enabled: s.enabled,
                        model: s.model.clone(),
                    },
                )
            })
            .collect()
    }

    /// Apply a previously persisted settings snapshot
    ///
    /// Unknown slot ids in the map are ignored; slots missing from the map
    /// keep their current state.
    pub fn apply_settings(&mut self, settings: &BTreeMap<SlotId, ProviderSetting>) {
        for slot in self.slots.iter_mut() {
            if let Some(setting) = settings.get(&slot.id) {
                slot.enabled = setting.enabled;
                slot.model = setting.model.clone();
            }
        }
    }
}
