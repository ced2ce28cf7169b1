//! Provider identity and slot registry
//!
//! Four fixed panel slots, each bound to a provider family. Slot identity
//! never changes during a session; enabled state and model selection do.

pub mod family;
pub mod registry;

pub use family::ProviderFamily;
pub use registry::{ProviderRegistry, ProviderSetting, ProviderSlot, SlotId};
