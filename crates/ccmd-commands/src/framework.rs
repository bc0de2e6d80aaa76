//! Poise framework setup and interaction dispatch.

use crate::routes::CommandRoutes;
use arc_swap::ArcSwap;
use ccmd_config::ConfigCache;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, trace};

/// Application data accessible in all event handlers.
pub struct Data {
    /// Current configuration, swapped on reload.
    pub config: Arc<ConfigCache>,
    /// Routes produced by the latest synchronization pass.
    pub routes: Arc<ArcSwap<CommandRoutes>>,
}

/// Application error type for handlers.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Creates a new Poise framework.
///
/// Custom commands are defined at runtime, so the framework carries no static
/// commands and interactions are answered from the event handler instead.
pub fn create_framework() -> poise::FrameworkBuilder<Data, Error> {
    poise::Framework::builder().options(poise::FrameworkOptions {
        event_handler: |ctx, event, framework, data| {
            Box::pin(event_handler(ctx, event, framework, data))
        },
        on_error: |error| Box::pin(on_error(error)),
        ..Default::default()
    })
}

async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::InteractionCreate {
        interaction: serenity::Interaction::Command(command),
    } = event
    {
        crate::reply::respond(ctx, command, data).await?;
    }
    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::UnknownInteraction { interaction, .. } => {
            // Answered by the event handler.
            trace!(command = %interaction.data.name, "Interaction outside the framework command list");
        }
        poise::FrameworkError::EventHandler { error, .. } => {
            error!(error = %error, "Failed to handle Discord event");
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!(error = %e, "Error while handling framework error");
            }
        }
    }
}
