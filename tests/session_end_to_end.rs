//! End-to-end session tests: full dispatch cycles over a wiremock store
//!
//! These drive `ChatSession` exactly as the terminal front-end does,
//! with the HTTP client underneath, covering the two-slot scenario and
//! the all-keys-missing aggregated alert.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use quadchat::providers::{ProviderRegistry, SlotId};
use quadchat::session::{event_channel, ChatSession, PanelEvent};
use quadchat::store::{HttpConversationStore, MessageRole};

fn slot(id: u8) -> SlotId {
    SlotId::new(id).unwrap()
}

async fn mount_get_conversation(server: &MockServer, messages: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/conversations/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "title": "Test", "system_prompt": "", "documents": [],
            "provider_settings": {}, "messages": messages
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn two_enabled_slots_fire_two_requests_and_reconcile() {
    let server = MockServer::start().await;

    // Slot 1 (OpenAI) is primary and persists the user message
    Mock::given(method("POST"))
        .and(path("/conversations/1/messages"))
        .and(body_partial_json(json!({
            "provider": "openai", "skip_user_message": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_message": {"id": 1, "role": "user", "content": "Explain recursion", "model": null},
            "assistant_message": {
                "id": 2, "role": "assistant", "content": "It calls itself.",
                "model": "gpt-5.1", "provider": "openai"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Slot 3 (Gemini) skips the user message
    Mock::given(method("POST"))
        .and(path("/conversations/1/messages"))
        .and(body_partial_json(json!({
            "provider": "gemini", "skip_user_message": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_message": null,
            "assistant_message": {
                "id": 3, "role": "assistant", "content": "Self-reference.",
                "model": "gemini-2.5-pro", "provider": "gemini"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Canonical history after the round trip
    mount_get_conversation(
        &server,
        json!([
            {"id": 1, "role": "user", "content": "Explain recursion", "model": null},
            {"id": 2, "role": "assistant", "content": "It calls itself.",
             "model": "gpt-5.1", "provider": "openai"},
            {"id": 3, "role": "assistant", "content": "Self-reference.",
             "model": "gemini-2.5-pro", "provider": "gemini"}
        ]),
    )
    .await;

    let store = Arc::new(HttpConversationStore::new(server.uri()).unwrap());
    let mut registry = ProviderRegistry::default();
    registry.toggle(slot(2));
    registry.toggle(slot(4));

    let (events, mut stream) = event_channel();
    let mut session = ChatSession::new(store, registry, Duration::from_millis(300), events);
    session.select_conversation(1).await.unwrap();

    session.dispatch("Explain recursion").await.unwrap();

    // Both loading indicators appeared and cleared independently
    let mut started = Vec::new();
    let mut finished = Vec::new();
    let mut replies = 0;
    while let Ok(event) = stream.try_recv() {
        match event {
            PanelEvent::LoadingStarted { slot } => started.push(slot),
            PanelEvent::LoadingFinished { slot } => finished.push(slot),
            PanelEvent::AssistantReply { .. } => replies += 1,
            other => panic!("unexpected event: {:?}", other),
        }
    }
    started.sort();
    finished.sort();
    assert_eq!(started, vec![slot(1), slot(3)]);
    assert_eq!(finished, vec![slot(1), slot(3)]);
    assert_eq!(replies, 2);

    // Reconciled panels: user bubble + reply in each responding panel
    let panels = session.panels();
    assert_eq!(panels.panel(slot(1)).len(), 2);
    assert_eq!(panels.panel(slot(3)).len(), 2);
    assert_eq!(panels.panel(slot(1))[0].role, MessageRole::User);
    assert!(panels.panel(slot(2)).is_empty());
    assert!(panels.panel(slot(4)).is_empty());
}

#[tokio::test]
async fn all_slots_without_keys_produce_one_alert() {
    let server = MockServer::start().await;

    for provider in ["OpenAI", "Claude", "Gemini", "Grok"] {
        Mock::given(method("POST"))
            .and(path("/conversations/1/messages"))
            .and(body_partial_json(json!({
                "provider": provider.to_lowercase()
            })))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "detail": format!("AI provider error: {} API key not configured", provider)
            })))
            .expect(1)
            .mount(&server)
            .await;
    }
    mount_get_conversation(&server, json!([])).await;

    let store = Arc::new(HttpConversationStore::new(server.uri()).unwrap());
    let (events, mut stream) = event_channel();
    let mut session = ChatSession::new(
        store,
        ProviderRegistry::default(),
        Duration::from_millis(300),
        events,
    );
    session.select_conversation(1).await.unwrap();

    session.dispatch("hello").await.unwrap();

    // Collect events until the alert fires; expect one error per panel
    // and exactly one alert.
    let mut panel_errors = 0;
    let mut alerts = Vec::new();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    loop {
        match tokio::time::timeout_at(deadline, stream.recv()).await {
            Ok(Some(PanelEvent::PanelError { .. })) => panel_errors += 1,
            Ok(Some(PanelEvent::Alert { text })) => {
                alerts.push(text);
                // Give a grace period for any (incorrect) second alert
                let grace = tokio::time::Instant::now() + Duration::from_millis(600);
                while let Ok(Some(event)) = tokio::time::timeout_at(grace, stream.recv()).await {
                    if let PanelEvent::Alert { text } = event {
                        alerts.push(text);
                    }
                }
                break;
            }
            Ok(Some(_)) => {}
            Ok(None) | Err(_) => break,
        }
    }

    assert_eq!(panel_errors, 4);
    assert_eq!(alerts.len(), 1, "alerts: {:?}", alerts);
    assert!(
        alerts[0].contains("ChatGPT, Claude, Gemini, & Grok"),
        "got: {}",
        alerts[0]
    );
}

#[tokio::test]
async fn dispatch_without_active_conversation_fails() {
    let server = MockServer::start().await;
    let store = Arc::new(HttpConversationStore::new(server.uri()).unwrap());
    let (events, _stream) = event_channel();
    let mut session = ChatSession::new(
        store,
        ProviderRegistry::default(),
        Duration::from_millis(300),
        events,
    );

    let err = session.dispatch("hello").await.unwrap_err();
    assert!(err.to_string().contains("no active conversation"));
}
