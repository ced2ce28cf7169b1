//! Concurrent dispatch engine
//!
//! One user message fans out to every enabled provider slot as independent
//! concurrent requests (fan-out/join, not sequential): all futures are
//! created before any is awaited, one provider's failure never cancels or
//! delays a sibling, and the cycle completes only when every request has
//! settled. Per-slot lifecycle events are emitted the instant each request
//! starts and settles; after the join, the caller reconciles against the
//! canonical conversation.
//!
//! Phases of one cycle: `Idle -> Building -> InFlight(n) -> Reconciling ->
//! Idle`. Re-invoking dispatch while a prior cycle is in flight is a caller
//! precondition, not enforced here.

use std::sync::Arc;

use crate::error::{QuadChatError, Result};
use crate::providers::{ProviderFamily, ProviderRegistry, SlotId};
use crate::session::alerts::AggregatorHandle;
use crate::session::events::{emit, EventSink, PanelEvent};
use crate::store::{ConversationStore, Message, SendMessageRequest};

/// One provider request within a dispatch cycle
///
/// Ephemeral: created at send time, discarded after resolution. Exactly one
/// request per cycle (the lowest enabled slot) is primary and persists the
/// user message server-side; the rest send `skip_user_message`.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    /// Target slot
    pub slot: SlotId,
    /// Vendor identity of the slot
    pub family: ProviderFamily,
    /// Model selected for the slot at send time
    pub model: String,
    /// The user message being fanned out
    pub message: String,
    /// Shared context, identical across the cycle
    pub context: Arc<str>,
    /// Whether this request persists the user message
    pub is_primary: bool,
}

/// Settled result of one slot's request
#[derive(Debug)]
pub struct SlotOutcome {
    /// Slot the request belonged to
    pub slot: SlotId,
    /// Assistant reply, or the failure scoped to this slot
    pub result: std::result::Result<Message, SlotFailure>,
}

/// Failure scoped to a single slot
///
/// Never propagates out of the cycle join; rendered as an error bubble and,
/// for configuration failures, coalesced into the aggregated alert.
#[derive(Debug, Clone)]
pub struct SlotFailure {
    /// Display name of the provider
    pub provider: String,
    /// Failure detail shown in the panel
    pub detail: String,
    /// Whether this is a configuration (missing key) failure
    pub is_config: bool,
}

/// Build the per-slot request list for one cycle
///
/// Slots come back in ascending id order; the first is marked primary.
/// Returns `NoProvidersEnabled` when the enabled set is empty.
pub fn plan_requests(
    registry: &ProviderRegistry,
    message: &str,
    context: Arc<str>,
) -> Result<Vec<DispatchRequest>> {
    let enabled = registry.enabled_slots();
    if enabled.is_empty() {
        return Err(QuadChatError::NoProvidersEnabled.into());
    }

    Ok(enabled
        .iter()
        .enumerate()
        .map(|(index, &slot)| {
            let s = registry.slot(slot);
            DispatchRequest {
                slot,
                family: s.family,
                model: s.model.clone(),
                message: message.to_string(),
                context: context.clone(),
                is_primary: index == 0,
            }
        })
        .collect())
}

/// Fan a planned request list out to the store and join all responses
///
/// Every request runs to completion independently; the returned outcomes
/// are in the same slot order as the input. Lifecycle and result events are
/// emitted per slot as each request starts and settles.
pub async fn fan_out(
    store: &dyn ConversationStore,
    conversation_id: i64,
    requests: Vec<DispatchRequest>,
    events: &EventSink,
    alerts: &AggregatorHandle,
) -> Vec<SlotOutcome> {
    let futures: Vec<_> = requests
        .into_iter()
        .map(|request| run_one(store, conversation_id, request, events, alerts))
        .collect();

    // Join, not race: the cycle is complete only when all N settle.
    futures::future::join_all(futures).await
}

/// Issue a single slot's request and convert its result to events
async fn run_one(
    store: &dyn ConversationStore,
    conversation_id: i64,
    request: DispatchRequest,
    events: &EventSink,
    alerts: &AggregatorHandle,
) -> SlotOutcome {
    let slot = request.slot;
    let display_name = request.family.display_name();

    emit(events, PanelEvent::LoadingStarted { slot });
    tracing::debug!(
        slot = slot.get(),
        provider = display_name,
        model = %request.model,
        primary = request.is_primary,
        "dispatching provider request"
    );

    let wire = SendMessageRequest {
        message: request.message.clone(),
        provider: request.family.api_id().to_string(),
        system_prompt: request.context.to_string(),
        model: Some(request.model.clone()),
        skip_user_message: !request.is_primary,
    };

    let result = match store.send_message(conversation_id, &wire).await {
        Ok(response) => {
            let mut message = response.assistant_message;
            // Attribution is authoritative client-side even if the store
            // echoes an untagged row.
            message.provider.get_or_insert(request.family);
            Ok(message)
        }
        Err(error) => Err(classify_failure(error, display_name)),
    };

    emit(events, PanelEvent::LoadingFinished { slot });
    match &result {
        Ok(message) => {
            emit(
                events,
                PanelEvent::AssistantReply {
                    slot,
                    message: message.clone(),
                },
            );
        }
        Err(failure) => {
            tracing::warn!(
                slot = slot.get(),
                provider = failure.provider.as_str(),
                "provider request failed: {}",
                failure.detail
            );
            emit(
                events,
                PanelEvent::PanelError {
                    slot,
                    detail: failure.detail.clone(),
                },
            );
            if failure.is_config {
                alerts.report(failure.provider.clone());
            }
        }
    }

    SlotOutcome { slot, result }
}

/// Map a request error into a slot-scoped failure
///
/// Configuration failures (missing keys) feed the aggregated alert;
/// transport failures and non-JSON server responses are rendered in the
/// panel only.
fn classify_failure(error: anyhow::Error, provider: &str) -> SlotFailure {
    match error.downcast_ref::<QuadChatError>() {
        Some(QuadChatError::ProviderConfig { detail, .. }) => SlotFailure {
            provider: provider.to_string(),
            detail: detail.clone(),
            is_config: true,
        },
        Some(QuadChatError::ProviderRequest { detail, .. }) => SlotFailure {
            provider: provider.to_string(),
            detail: detail.clone(),
            is_config: false,
        },
        Some(QuadChatError::Server { status }) => SlotFailure {
            provider: provider.to_string(),
            detail: format!("Server error: HTTP {}", status),
            is_config: false,
        },
        _ => SlotFailure {
            provider: provider.to_string(),
            detail: error.to_string(),
            is_config: false,
        },
    }
}
