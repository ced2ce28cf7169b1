//! Command handlers for the QuadChat CLI
//!
//! Each submodule wires configuration into the session layer and renders
//! results in the terminal. The chat loop is the reference consumer of the
//! session's typed panel events.

use crate::config::Config;
use crate::error::Result;

pub mod chat {
    //! Interactive multi-panel chat loop.
    //!
    //! Creates a `ChatSession` over the configured store, spawns a consumer
    //! task that renders panel events, and runs a readline loop that fans
    //! user input out to every enabled provider slot.

    use super::*;
    use std::sync::Arc;

    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    use crate::providers::{ProviderFamily, ProviderRegistry, SlotId};
    use crate::session::{event_channel, ChatSession, EventStream, PanelEvent, PanelSet};
    use crate::store::HttpConversationStore;

    /// Special commands recognized by the chat loop
    #[derive(Debug, Clone, PartialEq)]
    pub enum SpecialCommand {
        /// Show slot states
        Providers,
        /// Toggle a slot on/off
        Toggle(u8),
        /// Select a model for a slot
        Model(u8, String),
        /// Replace the shared system prompt
        System(String),
        /// Re-render per-panel history
        Panels,
        /// Show help
        Help,
        /// Leave the chat loop
        Exit,
        /// Not a special command; dispatch as a prompt
        None,
    }

    /// Parse a chat input line into a special command
    ///
    /// # Examples
    ///
    /// ```
    /// use quadchat::commands::chat::{parse_special_command, SpecialCommand};
    ///
    /// assert_eq!(parse_special_command("/toggle 2"), SpecialCommand::Toggle(2));
    /// assert_eq!(parse_special_command("hello"), SpecialCommand::None);
    /// ```
    pub fn parse_special_command(input: &str) -> SpecialCommand {
        let Some(rest) = input.strip_prefix('/') else {
            return SpecialCommand::None;
        };
        let mut parts = rest.splitn(3, char::is_whitespace);
        match parts.next().unwrap_or("") {
            "providers" => SpecialCommand::Providers,
            "toggle" => match parts.next().and_then(|n| n.parse::<u8>().ok()) {
                Some(n) => SpecialCommand::Toggle(n),
                None => SpecialCommand::Help,
            },
            "model" => {
                let slot = parts.next().and_then(|n| n.parse::<u8>().ok());
                let model = parts.next().map(str::trim).filter(|m| !m.is_empty());
                match (slot, model) {
                    (Some(n), Some(m)) => SpecialCommand::Model(n, m.to_string()),
                    _ => SpecialCommand::Help,
                }
            }
            "system" => {
                let prompt = rest.strip_prefix("system").unwrap_or("").trim();
                SpecialCommand::System(prompt.to_string())
            }
            "panels" => SpecialCommand::Panels,
            "help" => SpecialCommand::Help,
            "quit" | "exit" => SpecialCommand::Exit,
            _ => SpecialCommand::Help,
        }
    }

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `conversation` - Optional existing conversation id to resume
    /// * `title` - Title for a new conversation when not resuming
    pub async fn run_chat(
        config: Config,
        conversation: Option<i64>,
        title: Option<String>,
    ) -> Result<()> {
        let store = Arc::new(HttpConversationStore::new(config.server.api_base.clone())?);
        let registry = ProviderRegistry::from_config(&config.providers);

        let (events, stream) = event_channel();
        let mut session = ChatSession::new(store, registry, config.alert_window(), events);

        // Renderer runs independently so per-slot results appear the
        // moment they arrive, not when the whole cycle settles.
        let printer = tokio::spawn(render_events(stream));

        match conversation {
            Some(id) => {
                session.select_conversation(id).await?;
                let title = session.conversation().map(|c| c.title.clone()).unwrap_or_default();
                println!("Resumed conversation {} ({})", id, title.bold());
            }
            None => {
                let title = title.unwrap_or_else(|| "New Conversation".to_string());
                let id = session.new_conversation(&title).await?;
                println!("Created conversation {} ({})", id, title.bold());
            }
        }

        print_help();
        print_providers(&session);

        let mut rl = DefaultEditor::new()?;
        loop {
            match rl.readline("> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    match parse_special_command(trimmed) {
                        SpecialCommand::Providers => {
                            print_providers(&session);
                            continue;
                        }
                        SpecialCommand::Toggle(n) => {
                            match SlotId::new(n) {
                                Ok(slot) => {
                                    let enabled = session.toggle_provider(slot);
                                    let family = session.registry().slot(slot).family;
                                    let state = if enabled { "enabled".green() } else { "disabled".red() };
                                    println!("Slot {} ({}) {}", slot, family, state);
                                }
                                Err(e) => println!("{}", e.to_string().red()),
                            }
                            continue;
                        }
                        SpecialCommand::Model(n, model) => {
                            match SlotId::new(n) {
                                Ok(slot) => {
                                    session.set_model(slot, model.clone());
                                    println!("Slot {} model set to {}", slot, model.cyan());
                                }
                                Err(e) => println!("{}", e.to_string().red()),
                            }
                            continue;
                        }
                        SpecialCommand::System(prompt) => {
                            if let Err(e) = session.set_system_prompt(&prompt).await {
                                println!("{}", format!("Failed to save system prompt: {}", e).red());
                            } else {
                                println!("System prompt updated");
                            }
                            continue;
                        }
                        SpecialCommand::Panels => {
                            print_panels(&session.panels(), &session);
                            continue;
                        }
                        SpecialCommand::Help => {
                            print_help();
                            continue;
                        }
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => {}
                    }

                    // One dispatch cycle per prompt; the renderer shows
                    // per-slot progress while we wait for the join.
                    if let Err(e) = session.dispatch(trimmed).await {
                        println!("{}", e.to_string().red());
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    tracing::error!("readline error: {}", e);
                    break;
                }
            }
        }

        drop(session);
        let _ = printer.await;
        Ok(())
    }

    /// Render panel events as they arrive
    async fn render_events(mut stream: EventStream) {
        while let Some(event) = stream.recv().await {
            match event {
                PanelEvent::LoadingStarted { slot } => {
                    println!("{}", format!("[slot {}] thinking...", slot).dimmed());
                }
                PanelEvent::LoadingFinished { .. } => {}
                PanelEvent::AssistantReply { slot, message } => {
                    let name = message
                        .provider
                        .map(|f| f.display_name())
                        .unwrap_or("assistant");
                    println!("{}\n{}\n", format!("[slot {} {}]", slot, name).cyan().bold(), message.content);
                }
                PanelEvent::PanelError { slot, detail } => {
                    println!("{}", format!("[slot {}] error: {}", slot, detail).red());
                }
                PanelEvent::Alert { text } => {
                    println!("{}", format!("! {}", text).yellow().bold());
                }
            }
        }
    }

    fn print_providers(session: &ChatSession) {
        for slot in session.registry().slots() {
            let state = if slot.enabled { "on ".green() } else { "off".red() };
            println!(
                "  {} [{}] {:8} {}",
                slot.id,
                state,
                slot.family.display_name(),
                slot.model.dimmed()
            );
        }
    }

    fn print_panels(panels: &PanelSet, session: &ChatSession) {
        if panels.is_empty() {
            println!("(no panel history)");
            return;
        }
        for (slot, messages) in panels.iter() {
            if messages.is_empty() {
                continue;
            }
            let family: ProviderFamily = session.registry().slot(slot).family;
            println!("{}", format!("=== {} (slot {}) ===", family, slot).bold());
            for message in messages {
                let prefix = match message.role {
                    crate::store::MessageRole::User => "you".green().to_string(),
                    crate::store::MessageRole::Assistant => family.display_name().cyan().to_string(),
                    crate::store::MessageRole::Error => "error".red().to_string(),
                };
                println!("{}: {}", prefix, message.content);
            }
            println!();
        }
    }

    fn print_help() {
        println!("Commands:");
        println!("  /providers          show slot states");
        println!("  /toggle N           enable/disable slot N (1-4)");
        println!("  /model N NAME       select model NAME for slot N");
        println!("  /system TEXT        set the shared system prompt");
        println!("  /panels             re-render per-panel history");
        println!("  /help               show this help");
        println!("  /quit               leave chat");
        println!("Anything else is sent to every enabled provider.");
    }

}

pub mod conversations {
    //! Conversation management commands (list/new/delete).

    use super::*;

    use colored::Colorize;
    use prettytable::{row, Table};

    use crate::store::{ConversationStore, HttpConversationStore};

    /// List all conversations in a table
    pub async fn list(config: &Config) -> Result<()> {
        let store = HttpConversationStore::new(config.server.api_base.clone())?;
        let conversations = store.list_conversations().await?;

        if conversations.is_empty() {
            println!("No conversations yet.");
            return Ok(());
        }

        let mut table = Table::new();
        table.add_row(row!["ID", "Title", "Updated"]);
        for conversation in conversations {
            let updated = conversation
                .updated_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            table.add_row(row![conversation.id, conversation.title, updated]);
        }
        table.printstd();
        Ok(())
    }

    /// Create a new conversation
    pub async fn create(config: &Config, title: &str) -> Result<()> {
        let store = HttpConversationStore::new(config.server.api_base.clone())?;
        let conversation = store.create_conversation(title).await?;
        println!(
            "Created conversation {} ({})",
            conversation.id,
            conversation.title.bold()
        );
        Ok(())
    }

    /// Delete a conversation
    pub async fn delete(config: &Config, id: i64) -> Result<()> {
        let store = HttpConversationStore::new(config.server.api_base.clone())?;
        store.delete_conversation(id).await?;
        println!("Deleted conversation {}", id);
        Ok(())
    }
}
