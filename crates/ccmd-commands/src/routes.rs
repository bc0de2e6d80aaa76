//! Mapping from command name to the reply it answers with.

use ccmd_config::{CustomCommand, ReplyTemplate};
use std::collections::HashMap;

/// Reply template for every desired command, produced by a synchronization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandRoutes {
    replies: HashMap<String, ReplyTemplate>,
}

impl CommandRoutes {
    /// Builds routes from commands; the first command with a given name wins.
    pub fn from_commands<'a>(commands: impl IntoIterator<Item = &'a CustomCommand>) -> Self {
        let mut replies = HashMap::new();
        for command in commands {
            replies
                .entry(command.name.clone())
                .or_insert_with(|| command.reply.clone());
        }
        Self { replies }
    }

    /// Reply template for `name`.
    pub fn reply_for(&self, name: &str) -> Option<&ReplyTemplate> {
        self.replies.get(name)
    }

    /// Whether `name` is routed.
    pub fn contains(&self, name: &str) -> bool {
        self.replies.contains_key(name)
    }

    /// Number of routed commands.
    pub fn len(&self) -> usize {
        self.replies.len()
    }

    /// Whether no command is routed.
    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }

    /// Routed command names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.replies.keys().map(String::as_str)
    }
}
