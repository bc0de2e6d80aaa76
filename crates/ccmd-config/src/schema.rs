//! Configuration schema definitions using serde.

use ccmd_common::{parse_hex_color, CcmdError, LoggingConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Discord configuration.
    pub discord: DiscordConfig,
    /// Registered command state configuration.
    pub state: StateConfig,
    /// Configuration reload behaviour.
    pub reload: ReloadConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// Values substituted for `{key}` tokens in replies.
    pub placeholders: BTreeMap<String, String>,
    /// Custom slash commands, in declaration order.
    pub custom_commands: Vec<CustomCommand>,
}

/// Discord bot configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Discord bot token.
    pub token: String,
    /// Upper bound for a single command create/delete/list request.
    pub request_timeout_seconds: u64,
}

impl DiscordConfig {
    /// Request timeout as a [`Duration`].
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Where the registered command set is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Path of the JSON state file.
    pub path: PathBuf,
}

/// Configuration reload behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReloadConfig {
    /// Whether to watch the configuration file and resynchronize on change.
    pub watch: bool,
    /// Quiet period collapsing bursts of file events into one reload.
    pub debounce_ms: u64,
}

impl ReloadConfig {
    /// Debounce window as a [`Duration`].
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// A custom slash command declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomCommand {
    /// Command name, unique among enabled commands.
    #[serde(alias = "command")]
    pub name: String,
    /// Description shown in the Discord command picker.
    pub description: String,
    /// Whether the command should be registered.
    #[serde(default)]
    pub enabled: bool,
    /// Whether the command can be used in direct messages.
    #[serde(default)]
    pub allow_in_dm: bool,
    /// Reply sent when the command is invoked.
    #[serde(default)]
    pub reply: ReplyTemplate,
}

impl CustomCommand {
    /// Creates an enabled command with the default reply.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            enabled: true,
            allow_in_dm: false,
            reply: ReplyTemplate::default(),
        }
    }

    /// Sets the enabled flag.
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets whether the command is usable in direct messages.
    #[must_use]
    pub const fn allow_in_dm(mut self, allow: bool) -> Self {
        self.allow_in_dm = allow;
        self
    }

    /// Replaces the reply template.
    #[must_use]
    pub fn reply(mut self, reply: ReplyTemplate) -> Self {
        self.reply = reply;
        self
    }
}

/// Embed reply template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyTemplate {
    /// Embed description, may contain `{key}` placeholders.
    pub description: String,
    /// Embed colour as `#RRGGBB`.
    pub color: String,
}

impl ReplyTemplate {
    /// Creates a template with the given text and the default colour.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// Packed RGB value of the configured colour.
    pub fn color_value(&self) -> Option<u32> {
        parse_hex_color(&self.color)
    }
}

impl Config {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), CcmdError> {
        crate::validator::ConfigValidator::validate(self)
    }

    /// Commands whose `enabled` flag is set, in declaration order.
    pub fn enabled_commands(&self) -> impl Iterator<Item = &CustomCommand> {
        self.custom_commands.iter().filter(|command| command.enabled)
    }
}
