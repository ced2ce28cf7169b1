//! Error types for QuadChat
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for QuadChat operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, conversation store access, and provider
/// dispatch cycles.
#[derive(Error, Debug)]
pub enum QuadChatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Dispatch requested with zero enabled provider slots
    ///
    /// Raised before any network call is made; recoverable by enabling
    /// at least one provider.
    #[error("No providers enabled: enable at least one provider before sending")]
    NoProvidersEnabled,

    /// Provider configuration failure scoped to one slot (e.g. missing API key)
    #[error("Provider configuration error ({provider}): {detail}")]
    ProviderConfig {
        /// Wire identifier of the affected provider (e.g. "openai")
        provider: String,
        /// Server-reported detail message
        detail: String,
    },

    /// Provider request failure scoped to one slot (transport/HTTP failure)
    #[error("Provider request error ({provider}): {detail}")]
    ProviderRequest {
        /// Wire identifier of the affected provider (e.g. "openai")
        provider: String,
        /// Server-reported or transport detail message
        detail: String,
    },

    /// Failure to fetch, create, or select a conversation
    #[error("Conversation error: {0}")]
    ConversationLoad(String),

    /// Non-JSON error response from the conversation store
    ///
    /// Returned when the store responds with an unexpected body (e.g. an
    /// HTML error page); the HTTP status is embedded in the message.
    #[error("Server error: HTTP {status}")]
    Server {
        /// HTTP status code of the failed response
        status: u16,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl QuadChatError {
    /// Heuristic used to decide whether a slot failure is a configuration
    /// problem (missing/invalid credentials) rather than a transient
    /// request failure. Configuration failures additionally feed the
    /// aggregated alert.
    pub fn is_config_detail(detail: &str) -> bool {
        let lower = detail.to_lowercase();
        lower.contains("api key")
            || lower.contains("not configured")
            || lower.contains("credential")
    }
}

/// Result type alias for QuadChat operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
