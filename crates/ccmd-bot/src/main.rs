//! Main entry point for the custom commands bot.

use ccmd_bot::{BotResult, CustomCommandsBot};
use ccmd_common::init_logging;
use ccmd_config::ConfigLoader;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> BotResult<()> {
    let loader = ConfigLoader::from_env();
    let created = loader.init_if_missing()?;
    let config = loader.load()?;

    // Held until exit so buffered file logs are flushed.
    let _guard = init_logging(&config.logging)?;

    if created {
        warn!(path = %loader.path().display(), "Configuration file not found, wrote defaults");
    }
    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %loader.path().display(),
        commands = config.custom_commands.len(),
        "Starting custom commands bot"
    );

    let bot = CustomCommandsBot::new(loader, config);
    if let Err(e) = bot.start().await {
        error!(error = %e, "Bot stopped with an error");
        return Err(e);
    }

    Ok(())
}
