//! Conversation store client
//!
//! Thin request layer over the backend CRUD API. The [`ConversationStore`]
//! trait is the seam the session layer depends on; [`HttpConversationStore`]
//! is the reqwest-backed implementation. Error bodies are JSON with a
//! `detail` field; anything else (an HTML error page, a truncated body) is
//! mapped to [`QuadChatError::Server`] with the HTTP status embedded.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};

use crate::error::{QuadChatError, Result};
use crate::store::types::{
    Conversation, ConversationPatch, ConversationSummary, Document, SendMessageRequest,
    SendMessageResponse,
};

/// Abstract contract to the conversation persistence backend
///
/// Treated as an external collaborator; the dispatch engine and session
/// layer only ever talk to this trait, which keeps a dispatch cycle
/// testable without a live server.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// List all conversations, most recently updated first
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>>;

    /// Fetch a full conversation including messages, documents, and settings
    async fn get_conversation(&self, id: i64) -> Result<Conversation>;

    /// Create a new conversation with the given title
    async fn create_conversation(&self, title: &str) -> Result<Conversation>;

    /// Apply a partial update; absent fields are left untouched
    async fn update_conversation(&self, id: i64, patch: &ConversationPatch)
        -> Result<Conversation>;

    /// Delete a conversation
    async fn delete_conversation(&self, id: i64) -> Result<()>;

    /// Send one provider request for a user message
    ///
    /// The server appends the user message (unless `skip_user_message`),
    /// calls the provider, appends the assistant reply, and returns both.
    async fn send_message(&self, id: i64, request: &SendMessageRequest)
        -> Result<SendMessageResponse>;

    /// Upload a document for later attachment to a conversation
    async fn upload_document(&self, filename: &str, bytes: Vec<u8>) -> Result<Document>;
}

/// HTTP implementation of [`ConversationStore`]
///
/// # Examples
///
/// ```no_run
/// use quadchat::store::{ConversationStore, HttpConversationStore};
///
/// # async fn example() -> quadchat::error::Result<()> {
/// let store = HttpConversationStore::new("http://localhost:8000/api")?;
/// let conversations = store.list_conversations().await?;
/// # Ok(())
/// # }
/// ```
pub struct HttpConversationStore {
    client: Client,
    api_base: String,
}

/// Envelope of the conversation listing endpoint
#[derive(Debug, serde::Deserialize)]
struct ListConversationsResponse {
    conversations: Vec<ConversationSummary>,
}

/// Body of `POST /conversations`
#[derive(Debug, serde::Serialize)]
struct CreateConversationRequest<'a> {
    title: &'a str,
}

impl HttpConversationStore {
    /// Create a store client for the given API base (e.g. `http://host/api`)
    pub fn new(api_base: impl Into<String>) -> Result<Self> {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        let client = Client::builder().build()?;
        Ok(Self { client, api_base })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Decode a failed response into a typed error
    ///
    /// A JSON body with a `detail` string produces the given constructor's
    /// error; a non-JSON body produces `Server{status}`.
    async fn decode_error(response: Response) -> anyhow::Error {
        let status = response.status().as_u16();
        match response.json::<crate::store::types::ErrorBody>().await {
            Ok(body) => QuadChatError::ConversationLoad(body.detail).into(),
            Err(_) => QuadChatError::Server { status }.into(),
        }
    }
}

#[async_trait]
impl ConversationStore for HttpConversationStore {
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
        let response = self
            .client
            .get(self.url("/conversations"))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        let body: ListConversationsResponse = response.json().await?;
        Ok(body.conversations)
    }

    async fn get_conversation(&self, id: i64) -> Result<Conversation> {
        let response = self
            .client
            .get(self.url(&format!("/conversations/{}", id)))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response.json().await?)
    }

    async fn create_conversation(&self, title: &str) -> Result<Conversation> {
        let response = self
            .client
            .post(self.url("/conversations"))
            .json(&CreateConversationRequest { title })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response.json().await?)
    }

    async fn update_conversation(
        &self,
        id: i64,
        patch: &ConversationPatch,
    ) -> Result<Conversation> {
        let response = self
            .client
            .patch(self.url(&format!("/conversations/{}", id)))
            .json(patch)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response.json().await?)
    }

    async fn delete_conversation(&self, id: i64) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/conversations/{}", id)))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(())
    }

    async fn send_message(
        &self,
        id: i64,
        request: &SendMessageRequest,
    ) -> Result<SendMessageResponse> {
        let response = self
            .client
            .post(self.url(&format!("/conversations/{}/messages", id)))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Provider failures come back as {detail}; classify missing-key
            // style details as configuration errors so the aggregator can
            // coalesce them. Non-JSON bodies become Server{status}.
            let status_u16 = status.as_u16();
            return match response.json::<crate::store::types::ErrorBody>().await {
                Ok(body) if QuadChatError::is_config_detail(&body.detail) => {
                    Err(QuadChatError::ProviderConfig {
                        provider: request.provider.clone(),
                        detail: body.detail,
                    }
                    .into())
                }
                Ok(body) => Err(QuadChatError::ProviderRequest {
                    provider: request.provider.clone(),
                    detail: body.detail,
                }
                .into()),
                Err(_) => Err(QuadChatError::Server { status: status_u16 }.into()),
            };
        }

        Ok(response.json().await?)
    }

    async fn upload_document(&self, filename: &str, bytes: Vec<u8>) -> Result<Document> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let response = self
            .client
            .post(self.url("/upload/document"))
            .multipart(form)
            .send()
            .await?;
        if response.status() == StatusCode::UNSUPPORTED_MEDIA_TYPE {
            return Err(QuadChatError::Config(format!(
                "unsupported document type: {}",
                filename
            ))
            .into());
        }
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response.json().await?)
    }
}
