//! Session layer: dispatch engine, reconciliation, and alerts
//!
//! The modules here implement the core state machine: context building,
//! concurrent fan-out/join dispatch, two-pass panel reconciliation, and
//! debounced configuration-error aggregation, all tied together by
//! [`ChatSession`].

pub mod alerts;
pub mod context;
pub mod core;
pub mod dispatch;
pub mod events;
pub mod reconcile;

pub use alerts::{AggregatorHandle, ErrorAggregator, DEFAULT_ALERT_WINDOW};
pub use context::build_context;
pub use core::ChatSession;
pub use dispatch::{DispatchRequest, SlotFailure, SlotOutcome};
pub use events::{event_channel, EventSink, EventStream, PanelEvent};
pub use reconcile::{project_panels, PanelSet};
