//! Typed panel events
//!
//! The dispatch engine never touches presentation directly; it emits typed
//! events on a channel and a separate rendering layer (the terminal chat
//! loop, or anything else) consumes them. This keeps the state machine
//! independently testable.

use tokio::sync::mpsc;

use crate::providers::SlotId;
use crate::store::Message;

/// Event emitted by the session toward the rendering layer
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    /// A slot's request was issued; show its loading indicator
    LoadingStarted {
        /// Affected slot
        slot: SlotId,
    },
    /// A slot's request settled (success or failure); clear its indicator
    ///
    /// Emitted the instant that slot's own response arrives, independent of
    /// sibling requests.
    LoadingFinished {
        /// Affected slot
        slot: SlotId,
    },
    /// A provider replied; append to the slot's panel
    AssistantReply {
        /// Affected slot
        slot: SlotId,
        /// Persisted assistant message
        message: Message,
    },
    /// A slot's request failed; render an error bubble in that panel
    PanelError {
        /// Affected slot
        slot: SlotId,
        /// Failure detail shown in the bubble
        detail: String,
    },
    /// Coalesced configuration-error notification from the aggregator
    Alert {
        /// Notification text listing the affected providers
        text: String,
    },
}

/// Sending half of the event channel
pub type EventSink = mpsc::UnboundedSender<PanelEvent>;

/// Receiving half of the event channel
pub type EventStream = mpsc::UnboundedReceiver<PanelEvent>;

/// Create an event channel pair
pub fn event_channel() -> (EventSink, EventStream) {
    mpsc::unbounded_channel()
}

/// Send an event, ignoring a disconnected receiver
///
/// Rendering is best-effort: a dropped consumer must not fail a dispatch
/// cycle.
pub fn emit(sink: &EventSink, event: PanelEvent) {
    if sink.send(event).is_err() {
        tracing::debug!("panel event dropped: no active consumer");
    }
}
