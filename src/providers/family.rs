//! Provider family identity
//!
//! A provider family is the vendor identity behind a panel slot (OpenAI,
//! Anthropic, Google, xAI), independent of which specific model is currently
//! selected for that slot. Messages written by this crate carry an explicit
//! family tag; keyword matching against the model string exists only as a
//! fallback for history rows persisted before tagging was introduced.

use serde::{Deserialize, Serialize};

/// The four supported provider families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderFamily {
    /// OpenAI (ChatGPT) models: gpt-*, o3, o4-*
    OpenAi,
    /// Anthropic Claude models
    Claude,
    /// Google Gemini models
    Gemini,
    /// xAI Grok models
    Grok,
}

impl ProviderFamily {
    /// All families in fixed slot order (slot 1 through slot 4)
    pub const ALL: [ProviderFamily; 4] = [
        ProviderFamily::OpenAi,
        ProviderFamily::Claude,
        ProviderFamily::Gemini,
        ProviderFamily::Grok,
    ];

    /// Human-readable name shown in panels and alerts
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAi => "ChatGPT",
            Self::Claude => "Claude",
            Self::Gemini => "Gemini",
            Self::Grok => "Grok",
        }
    }

    /// Identifier sent as the `provider` field of a message request
    pub fn api_id(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Claude => "claude",
            Self::Gemini => "gemini",
            Self::Grok => "grok",
        }
    }

    /// Default model selected for a fresh slot
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-5.1",
            Self::Claude => "claude-sonnet-4.5",
            Self::Gemini => "gemini-2.5-pro",
            Self::Grok => "grok-4",
        }
    }

    /// Resolve a family from a free-text model identifier
    ///
    /// Keyword fallback for messages that predate explicit provider tagging.
    /// The keyword set mirrors the store's own history filter: `gpt`/`o3`/
    /// `o4`/`openai` for OpenAI, plus the literal family names. A model
    /// string matching no keyword resolves to `None` and the message is
    /// dropped from panel views (it remains in canonical history).
    ///
    /// # Examples
    ///
    /// ```
    /// use quadchat::providers::ProviderFamily;
    ///
    /// assert_eq!(ProviderFamily::from_model("gpt-4o"), Some(ProviderFamily::OpenAi));
    /// assert_eq!(ProviderFamily::from_model("claude-sonnet-4.5"), Some(ProviderFamily::Claude));
    /// assert_eq!(ProviderFamily::from_model("llama3.2"), None);
    /// ```
    pub fn from_model(model: &str) -> Option<Self> {
        let lower = model.to_lowercase();
        if lower.contains("gpt")
            || lower.contains("openai")
            || lower.starts_with("o3")
            || lower.starts_with("o4")
        {
            Some(Self::OpenAi)
        } else if lower.contains("claude") {
            Some(Self::Claude)
        } else if lower.contains("gemini") {
            Some(Self::Gemini)
        } else if lower.contains("grok") {
            Some(Self::Grok)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
