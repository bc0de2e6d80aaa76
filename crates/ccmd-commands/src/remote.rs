//! Global application command calls against Discord.

use async_trait::async_trait;
use ccmd_common::CommandId;
use ccmd_config::CustomCommand;
use poise::serenity_prelude as serenity;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A global command as reported by Discord.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    /// Discord id of the command.
    pub id: CommandId,
    /// Command name.
    pub name: String,
    /// Description shown in the command picker.
    pub description: String,
    /// Whether the command is usable in direct messages.
    pub dm_permission: bool,
}

impl RemoteCommand {
    /// Whether Discord already shows `command` as configured.
    pub fn matches(&self, command: &CustomCommand) -> bool {
        self.name == command.name
            && self.description == command.description
            && self.dm_permission == command.allow_in_dm
    }
}

impl From<serenity::Command> for RemoteCommand {
    fn from(command: serenity::Command) -> Self {
        Self {
            id: CommandId(command.id.get()),
            name: command.name,
            description: command.description,
            // Discord omits the flag when it has its default value.
            dm_permission: command.dm_permission.unwrap_or(true),
        }
    }
}

/// Failure of a single remote call.
#[derive(thiserror::Error, Debug)]
pub enum RemoteError {
    /// Discord/Serenity error.
    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),

    /// The request did not complete in time.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The request was refused for another reason.
    #[error("Request rejected: {0}")]
    Rejected(String),
}

/// Discord's global application command endpoints.
#[async_trait]
pub trait CommandService: Send + Sync {
    /// Lists the bot's global commands.
    async fn list_global_commands(&self) -> Result<Vec<RemoteCommand>, RemoteError>;

    /// Creates a global chat input command, overwriting one with the same name.
    async fn create_command(&self, command: &CustomCommand) -> Result<RemoteCommand, RemoteError>;

    /// Deletes a global command.
    async fn delete_command(&self, id: CommandId) -> Result<(), RemoteError>;
}

#[async_trait]
impl<T: CommandService + ?Sized> CommandService for Arc<T> {
    async fn list_global_commands(&self) -> Result<Vec<RemoteCommand>, RemoteError> {
        (**self).list_global_commands().await
    }

    async fn create_command(&self, command: &CustomCommand) -> Result<RemoteCommand, RemoteError> {
        (**self).create_command(command).await
    }

    async fn delete_command(&self, id: CommandId) -> Result<(), RemoteError> {
        (**self).delete_command(id).await
    }
}

/// Builds the chat input command Discord should show for `command`.
pub fn build_command(command: &CustomCommand) -> serenity::CreateCommand {
    serenity::CreateCommand::new(&command.name)
        .description(&command.description)
        .dm_permission(command.allow_in_dm)
}

/// [`CommandService`] backed by serenity's HTTP client.
///
/// Each call is bounded by `timeout`; a call that runs out of time fails on
/// its own without affecting the others.
pub struct SerenityCommandService {
    http: Arc<serenity::Http>,
    timeout: Duration,
}

impl SerenityCommandService {
    /// Creates a service using the given HTTP client.
    pub const fn new(http: Arc<serenity::Http>, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    async fn bounded<T>(
        &self,
        request: impl Future<Output = serenity::Result<T>> + Send,
    ) -> Result<T, RemoteError> {
        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| RemoteError::Timeout(self.timeout))?
            .map_err(RemoteError::from)
    }
}

#[async_trait]
impl CommandService for SerenityCommandService {
    async fn list_global_commands(&self) -> Result<Vec<RemoteCommand>, RemoteError> {
        let commands = self
            .bounded(serenity::Command::get_global_commands(&self.http))
            .await?;
        debug!(count = commands.len(), "Fetched global commands");

        Ok(commands.into_iter().map(RemoteCommand::from).collect())
    }

    async fn create_command(&self, command: &CustomCommand) -> Result<RemoteCommand, RemoteError> {
        let created = self
            .bounded(serenity::Command::create_global_command(
                &self.http,
                build_command(command),
            ))
            .await?;

        Ok(created.into())
    }

    async fn delete_command(&self, id: CommandId) -> Result<(), RemoteError> {
        self.bounded(serenity::Command::delete_global_command(
            &self.http,
            serenity::CommandId::new(id.0),
        ))
        .await
    }
}
