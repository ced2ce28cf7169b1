//! Command-line interface definition for QuadChat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the interactive chat loop and conversation
//! management.

use clap::{Parser, Subcommand};

/// QuadChat - side-by-side multi-provider chat
///
/// Send one prompt to up to four LLM providers at once and compare their
/// replies panel by panel.
#[derive(Parser, Debug, Clone)]
#[command(name = "quadchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Override the conversation store API base URL
    #[arg(long, env = "QUADCHAT_API_BASE")]
    pub api_base: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for QuadChat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the interactive multi-panel chat loop
    Chat {
        /// Resume an existing conversation by id
        #[arg(short = 'r', long)]
        conversation: Option<i64>,

        /// Title for a new conversation (ignored when resuming)
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Manage conversations
    Conversations {
        /// Conversation management subcommand
        #[command(subcommand)]
        command: ConversationCommand,
    },
}

/// Conversation management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConversationCommand {
    /// List all conversations
    List,

    /// Create a new conversation
    New {
        /// Conversation title
        title: String,
    },

    /// Delete a conversation
    Delete {
        /// Conversation id
        id: i64,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
