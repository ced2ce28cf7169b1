//! QuadChat - multi-provider chat CLI
//!
//! Main entry point for the QuadChat terminal front-end.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use quadchat::cli::{Cli, Commands, ConversationCommand};
use quadchat::commands;
use quadchat::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load and validate configuration
    let config_path = cli.config.clone().unwrap_or_else(|| "config/config.yaml".to_string());
    let config = Config::load(&config_path, &cli)?;
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat {
            conversation,
            title,
        } => {
            tracing::info!("Starting interactive chat mode");
            if let Some(id) = conversation {
                tracing::debug!("Resuming conversation: {}", id);
            }
            commands::chat::run_chat(config, conversation, title).await?;
            Ok(())
        }
        Commands::Conversations { command } => match command {
            ConversationCommand::List => {
                commands::conversations::list(&config).await?;
                Ok(())
            }
            ConversationCommand::New { title } => {
                commands::conversations::create(&config, &title).await?;
                Ok(())
            }
            ConversationCommand::Delete { id } => {
                commands::conversations::delete(&config, id).await?;
                Ok(())
            }
        },
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "quadchat=debug" } else { "quadchat=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
