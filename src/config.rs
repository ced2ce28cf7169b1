//! Configuration management for QuadChat
//!
//! This module handles loading, parsing, and validating configuration from
//! a YAML file with CLI overrides. A missing config file is not an error;
//! defaults apply.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{QuadChatError, Result};
use crate::providers::ProviderFamily;

/// Main configuration structure for QuadChat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Conversation store server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Chat behavior settings
    #[serde(default)]
    pub chat: ChatConfig,

    /// Per-family slot defaults (enabled state, model)
    #[serde(default)]
    pub providers: BTreeMap<ProviderFamily, SlotConfig>,
}

/// Conversation store server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the conversation store API
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    "http://localhost:8000/api".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
        }
    }
}

/// Chat behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Quiet period (milliseconds) before a coalesced alert fires
    #[serde(default = "default_alert_window_ms")]
    pub alert_window_ms: u64,
}

fn default_alert_window_ms() -> u64 {
    300
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            alert_window_ms: default_alert_window_ms(),
        }
    }
}

/// Startup defaults for one provider slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotConfig {
    /// Whether the slot starts enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Model selected at startup; family default when omitted
    #[serde(default)]
    pub model: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            model: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file with CLI overrides
    ///
    /// A missing file yields defaults; a present but malformed file is an
    /// error. The `--api-base` CLI flag overrides the file value.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use quadchat::cli::Cli;
    /// use quadchat::config::Config;
    ///
    /// # fn example(cli: &Cli) -> quadchat::error::Result<()> {
    /// let config = Config::load("config/config.yaml", cli)?;
    /// config.validate()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            let contents = std::fs::read_to_string(path)?;
            serde_yaml::from_str(&contents)?
        } else {
            tracing::debug!("config file {} not found, using defaults", path);
            Self::default()
        };

        if let Some(api_base) = &cli.api_base {
            config.server.api_base = api_base.clone();
        }

        Ok(config)
    }

    /// Validate the configuration
    ///
    /// The API base must parse as an http/https URL and the alert window
    /// must be non-zero.
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.server.api_base).map_err(|e| {
            QuadChatError::Config(format!(
                "invalid api_base '{}': {}",
                self.server.api_base, e
            ))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(QuadChatError::Config(format!(
                "api_base must be http or https, got '{}'",
                parsed.scheme()
            ))
            .into());
        }
        if self.chat.alert_window_ms == 0 {
            return Err(
                QuadChatError::Config("chat.alert_window_ms must be greater than 0".to_string())
                    .into(),
            );
        }
        Ok(())
    }

    /// Alert quiet window as a [`std::time::Duration`]
    pub fn alert_window(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.chat.alert_window_ms)
    }
}
