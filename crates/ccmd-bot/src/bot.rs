//! Core bot logic using the Poise framework.

use crate::error::BotResult;
use arc_swap::ArcSwap;
use ccmd_commands::{
    create_framework, CommandRoutes, CommandService, CommandSynchronizer, Data, JsonFileStore,
    SerenityCommandService, StateStore,
};
use ccmd_config::{Config, ConfigCache, ConfigLoader, ConfigWatcher};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Main bot structure.
pub struct CustomCommandsBot {
    loader: ConfigLoader,
    config: Arc<ConfigCache>,
}

impl CustomCommandsBot {
    /// Creates a new bot instance from an already loaded configuration.
    pub fn new(loader: ConfigLoader, config: Config) -> Self {
        Self {
            loader,
            config: Arc::new(ConfigCache::new(config)),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> Arc<Config> {
        self.config.get()
    }

    /// Connects to Discord and runs until the gateway shuts down.
    ///
    /// Commands are synchronized once the first `Ready` arrives; with
    /// `reload.watch` set, every later configuration change triggers
    /// another pass.
    pub async fn start(&self) -> BotResult<()> {
        let cache = Arc::clone(&self.config);
        let loader = self.loader.clone();

        let framework = create_framework()
            .setup(move |ctx, ready, _framework| {
                Box::pin(async move {
                    info!(user = %ready.user.name, "Connected to Discord");
                    let config = cache.get();

                    let service = SerenityCommandService::new(
                        Arc::clone(&ctx.http),
                        config.discord.request_timeout(),
                    );
                    let store = JsonFileStore::new(&config.state.path);
                    let sync = Arc::new(CommandSynchronizer::load(service, store).await?);
                    let routes = Arc::new(ArcSwap::from_pointee(CommandRoutes::default()));

                    synchronize(&*sync, &config, &routes).await;

                    if config.reload.watch {
                        tokio::spawn(watch_config(
                            loader,
                            Arc::clone(&cache),
                            sync,
                            Arc::clone(&routes),
                        ));
                    }

                    Ok(Data {
                        config: cache,
                        routes,
                    })
                })
            })
            .build();

        let token = self.config.get().discord.token.clone();
        let mut client =
            serenity::ClientBuilder::new(token, serenity::GatewayIntents::GUILDS)
                .framework(framework)
                .await?;

        let shard_manager = Arc::clone(&client.shard_manager);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown requested");
                shard_manager.shutdown_all().await;
            }
        });

        client.start().await?;
        info!("Disconnected from Discord");
        Ok(())
    }
}

/// Runs one synchronization pass and publishes its routes.
///
/// Returns whether the pass ran. When it could not run, the previously
/// published routes stay in place.
pub async fn synchronize<S, P>(
    sync: &CommandSynchronizer<S, P>,
    config: &Config,
    routes: &ArcSwap<CommandRoutes>,
) -> bool
where
    S: CommandService,
    P: StateStore,
{
    match sync.run(&config.custom_commands).await {
        Ok(report) => {
            report.log_summary();
            routes.store(Arc::new(report.routes));
            true
        }
        Err(e) => {
            error!(error = %e, "Command synchronization failed, keeping previous routes");
            false
        }
    }
}

/// Reloads configuration on file changes and resynchronizes commands.
///
/// Invalid configuration is logged and ignored. Discord token, request
/// timeout and state path changes only take effect after a restart.
pub async fn watch_config<S, P>(
    loader: ConfigLoader,
    cache: Arc<ConfigCache>,
    sync: Arc<CommandSynchronizer<S, P>>,
    routes: Arc<ArcSwap<CommandRoutes>>,
) where
    S: CommandService,
    P: StateStore,
{
    let debounce = cache.get().reload.debounce();
    let mut watcher = match ConfigWatcher::watch(loader.path(), debounce) {
        Ok(watcher) => watcher,
        Err(e) => {
            warn!(error = %e, "Configuration reload disabled");
            return;
        }
    };
    info!(path = %loader.path().display(), "Watching configuration for changes");

    while watcher.changed().await.is_some() {
        let config = match loader.load() {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Ignoring invalid configuration change");
                continue;
            }
        };

        cache.update(config);
        info!("Configuration reloaded");
        synchronize(&*sync, &cache.get(), &routes).await;
    }
}
