//! Integration tests for ccmd-bot crate.
//!
//! These tests exercise route publishing and configuration reloads without a
//! gateway connection.

use arc_swap::ArcSwap;
use async_trait::async_trait;
use ccmd_bot::{synchronize, watch_config, BotError, CustomCommandsBot};
use ccmd_commands::{
    CommandRoutes, CommandService, CommandSynchronizer, MemoryStore, RemoteCommand, RemoteError,
};
use ccmd_common::test_utils::{config_fixtures, create_temp_dir, init_test_logging};
use ccmd_common::{CcmdError, CommandId};
use ccmd_config::{Config, ConfigCache, ConfigError, ConfigLoader, CustomCommand};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct FakeDiscord {
    live: Mutex<BTreeMap<String, RemoteCommand>>,
    next_id: AtomicU64,
    unreachable: AtomicBool,
}

#[async_trait]
impl CommandService for FakeDiscord {
    async fn list_global_commands(&self) -> Result<Vec<RemoteCommand>, RemoteError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(RemoteError::Timeout(Duration::from_secs(1)));
        }
        Ok(self.live.lock().unwrap().values().cloned().collect())
    }

    async fn create_command(&self, command: &CustomCommand) -> Result<RemoteCommand, RemoteError> {
        let remote = RemoteCommand {
            id: CommandId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            name: command.name.clone(),
            description: command.description.clone(),
            dm_permission: command.allow_in_dm,
        };
        self.live
            .lock()
            .unwrap()
            .insert(command.name.clone(), remote.clone());
        Ok(remote)
    }

    async fn delete_command(&self, id: CommandId) -> Result<(), RemoteError> {
        self.live.lock().unwrap().retain(|_, remote| remote.id != id);
        Ok(())
    }
}

fn config_with(commands: &[&str]) -> Config {
    let mut config = Config::default();
    config.discord.token = "test_token".to_string();
    config.custom_commands = commands
        .iter()
        .map(|name| CustomCommand::new(*name, "Test command"))
        .collect();
    config
}

#[tokio::test]
async fn test_synchronize_publishes_routes() {
    init_test_logging();
    let discord = Arc::new(FakeDiscord::default());
    let sync = CommandSynchronizer::load(Arc::clone(&discord), MemoryStore::default())
        .await
        .unwrap();
    let routes = ArcSwap::from_pointee(CommandRoutes::default());

    assert!(synchronize(&sync, &config_with(&["ip", "rules"]), &routes).await);

    let published = routes.load();
    assert!(published.contains("ip"));
    assert!(published.contains("rules"));
    assert_eq!(discord.live.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_failed_pass_keeps_previous_routes() {
    let discord = Arc::new(FakeDiscord::default());
    let sync = CommandSynchronizer::load(Arc::clone(&discord), MemoryStore::default())
        .await
        .unwrap();
    let routes = ArcSwap::from_pointee(CommandRoutes::default());

    assert!(synchronize(&sync, &config_with(&["ip"]), &routes).await);
    discord.unreachable.store(true, Ordering::SeqCst);
    assert!(!synchronize(&sync, &config_with(&["rules"]), &routes).await);

    let published = routes.load();
    assert!(published.contains("ip"));
    assert!(!published.contains("rules"));
}

#[tokio::test]
async fn test_config_change_triggers_resync() {
    init_test_logging();
    let dir = create_temp_dir();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, config_fixtures::minimal_config_yaml()).unwrap();

    let loader = ConfigLoader::new(&path);
    let mut initial = loader.load().unwrap();
    initial.reload.debounce_ms = 50;
    let cache = Arc::new(ConfigCache::new(initial));

    let discord = Arc::new(FakeDiscord::default());
    let sync = Arc::new(
        CommandSynchronizer::load(Arc::clone(&discord), MemoryStore::default())
            .await
            .unwrap(),
    );
    let routes = Arc::new(ArcSwap::from_pointee(CommandRoutes::default()));
    assert!(synchronize(&*sync, &cache.get(), &routes).await);

    let task = tokio::spawn(watch_config(
        loader.clone(),
        Arc::clone(&cache),
        Arc::clone(&sync),
        Arc::clone(&routes),
    ));
    tokio::time::sleep(Duration::from_millis(200)).await;

    let mut updated = config_with(&["ip", "rules"]);
    updated.reload.debounce_ms = 50;
    loader.save(&updated).unwrap();

    let reloaded = tokio::time::timeout(Duration::from_secs(5), async {
        while !routes.load().contains("rules") {
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    })
    .await;
    task.abort();

    assert!(reloaded.is_ok(), "configuration change was not picked up");
    assert_eq!(cache.get().custom_commands.len(), 2);
    assert!(discord.live.lock().unwrap().contains_key("rules"));
}

#[test]
fn test_bot_exposes_loaded_config() {
    let bot = CustomCommandsBot::new(ConfigLoader::new("config.yaml"), config_with(&["ip"]));
    assert_eq!(bot.config().custom_commands[0].name, "ip");
}

#[test]
fn test_config_error_converts() {
    let error: BotError = ConfigError::Validation("discord.token: must not be empty".to_string()).into();
    assert!(error.to_string().starts_with("Configuration error"));
}

#[test]
fn test_logging_error_converts() {
    let error: BotError = CcmdError::Logging("invalid log level `loud`".to_string()).into();
    assert!(matches!(error, BotError::Common(_)));
    assert_eq!(error.to_string(), "Logging error: invalid log level `loud`");
}
