//! Default values for every configuration section.

use crate::schema::*;
use ccmd_common::LoggingConfig;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Reply text used when a command does not configure one.
pub const DEFAULT_REPLY_DESCRIPTION: &str = "Your custom message here :)";

/// Discord's "success" green.
pub const DEFAULT_REPLY_COLOR: &str = "#43B581";

/// Default location of the registered command state.
pub const DEFAULT_STATE_PATH: &str = "data/registered_commands.json";

impl Default for Config {
    fn default() -> Self {
        let mut placeholders = BTreeMap::new();
        placeholders.insert("server.address".to_string(), "127.0.0.1".to_string());
        placeholders.insert("server.port".to_string(), "28015".to_string());

        Self {
            discord: DiscordConfig::default(),
            state: StateConfig::default(),
            reload: ReloadConfig::default(),
            logging: LoggingConfig::default(),
            placeholders,
            custom_commands: default_custom_commands(),
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            request_timeout_seconds: 10,
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STATE_PATH),
        }
    }
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            watch: true,
            debounce_ms: 500,
        }
    }
}

impl Default for ReplyTemplate {
    fn default() -> Self {
        Self {
            description: DEFAULT_REPLY_DESCRIPTION.to_string(),
            color: DEFAULT_REPLY_COLOR.to_string(),
        }
    }
}

/// Commands written to a freshly created configuration file.
///
/// The sample `ip` command ships disabled.
pub fn default_custom_commands() -> Vec<CustomCommand> {
    vec![CustomCommand::new("ip", "Shows the IP and port of the server")
        .enabled(false)
        .allow_in_dm(true)
        .reply(ReplyTemplate::new(
            "The server address is: `{server.address}:{server.port}`",
        ))]
}
