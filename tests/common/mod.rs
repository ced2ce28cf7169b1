//! Shared test fixtures: an in-memory conversation store that records
//! every request and serves scripted responses.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use quadchat::error::{QuadChatError, Result};
use quadchat::providers::ProviderFamily;
use quadchat::store::{
    Conversation, ConversationPatch, ConversationStore, ConversationSummary, Document, Message,
    SendMessageRequest, SendMessageResponse,
};

/// Scripted behavior for one provider's message endpoint
#[derive(Debug, Clone)]
pub enum ProviderScript {
    /// Reply with the given content
    Reply(String),
    /// Reply with the given content after a simulated provider latency
    Delayed(Duration, String),
    /// Fail with a `{detail}` the client classifies as a config error
    MissingKey,
    /// Fail with a transport-style detail
    RequestError(String),
}

/// In-memory store that records requests and serves scripted responses
pub struct RecordingStore {
    pub conversation: Mutex<Conversation>,
    pub scripts: HashMap<&'static str, ProviderScript>,
    pub sent: Mutex<Vec<SendMessageRequest>>,
    pub patches: Mutex<Vec<ConversationPatch>>,
}

impl RecordingStore {
    pub fn new(conversation: Conversation) -> Self {
        Self {
            conversation: Mutex::new(conversation),
            scripts: HashMap::new(),
            sent: Mutex::new(Vec::new()),
            patches: Mutex::new(Vec::new()),
        }
    }

    pub fn script(mut self, provider: &'static str, script: ProviderScript) -> Self {
        self.scripts.insert(provider, script);
        self
    }

    pub fn sent_requests(&self) -> Vec<SendMessageRequest> {
        self.sent.lock().unwrap().clone()
    }

    fn record_reply(
        &self,
        request: &SendMessageRequest,
        content: String,
        family: ProviderFamily,
    ) -> SendMessageResponse {
        let model = request.model.clone().unwrap_or_default();
        let mut conversation = self.conversation.lock().unwrap();
        if !request.skip_user_message {
            conversation.messages.push(Message::user(request.message.clone()));
        }
        let assistant = Message::assistant(content, model, family);
        conversation.messages.push(assistant.clone());
        SendMessageResponse {
            user_message: None,
            assistant_message: assistant,
        }
    }
}

/// Empty conversation fixture
pub fn empty_conversation(id: i64) -> Conversation {
    Conversation {
        id,
        title: "Test".to_string(),
        system_prompt: String::new(),
        documents: Vec::new(),
        provider_settings: Default::default(),
        messages: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

fn family_for(provider: &str) -> ProviderFamily {
    match provider {
        "openai" => ProviderFamily::OpenAi,
        "claude" => ProviderFamily::Claude,
        "gemini" => ProviderFamily::Gemini,
        _ => ProviderFamily::Grok,
    }
}

#[async_trait]
impl ConversationStore for RecordingStore {
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
        let conversation = self.conversation.lock().unwrap();
        Ok(vec![ConversationSummary {
            id: conversation.id,
            title: conversation.title.clone(),
            created_at: None,
            updated_at: None,
        }])
    }

    async fn get_conversation(&self, _id: i64) -> Result<Conversation> {
        Ok(self.conversation.lock().unwrap().clone())
    }

    async fn create_conversation(&self, title: &str) -> Result<Conversation> {
        let mut conversation = self.conversation.lock().unwrap();
        conversation.title = title.to_string();
        Ok(conversation.clone())
    }

    async fn update_conversation(
        &self,
        _id: i64,
        patch: &ConversationPatch,
    ) -> Result<Conversation> {
        self.patches.lock().unwrap().push(patch.clone());
        Ok(self.conversation.lock().unwrap().clone())
    }

    async fn delete_conversation(&self, _id: i64) -> Result<()> {
        Ok(())
    }

    async fn send_message(
        &self,
        _id: i64,
        request: &SendMessageRequest,
    ) -> Result<SendMessageResponse> {
        self.sent.lock().unwrap().push(request.clone());

        let family = family_for(&request.provider);
        let script = self
            .scripts
            .get(request.provider.as_str())
            .cloned()
            .unwrap_or_else(|| ProviderScript::Reply(format!("{} reply", request.provider)));

        match script {
            ProviderScript::Reply(content) => Ok(self.record_reply(request, content, family)),
            ProviderScript::Delayed(latency, content) => {
                tokio::time::sleep(latency).await;
                Ok(self.record_reply(request, content, family))
            }
            ProviderScript::MissingKey => Err(QuadChatError::ProviderConfig {
                provider: request.provider.clone(),
                detail: format!("{} API key not configured", family.display_name()),
            }
            .into()),
            ProviderScript::RequestError(detail) => Err(QuadChatError::ProviderRequest {
                provider: request.provider.clone(),
                detail,
            }
            .into()),
        }
    }

    async fn upload_document(&self, filename: &str, _bytes: Vec<u8>) -> Result<Document> {
        Ok(Document {
            id: filename.to_string(),
            filename: filename.to_string(),
            content: "uploaded".to_string(),
            file_type: Some("txt".to_string()),
        })
    }
}
