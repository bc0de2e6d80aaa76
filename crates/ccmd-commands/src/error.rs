//! Error types for command synchronization using thiserror.

use crate::remote::RemoteError;
use crate::store::StoreError;

/// A problem found or hit during a reconciliation pass.
///
/// Every variant except [`ReconcileError::RemoteListFailed`] is local to one
/// command or one write; the pass carries on and the failed action shows up
/// again on the next pass.
#[derive(thiserror::Error, Debug)]
pub enum ReconcileError {
    /// The same name is declared by more than one enabled command.
    #[error("Attempting to register duplicate command `{name}`")]
    DuplicateCommandName {
        /// Duplicated command name.
        name: String,
    },

    /// Discord rejected or did not answer a create request.
    #[error("Failed to register command `{name}`: {source}")]
    RemoteRegistrationFailed {
        /// Command that was not registered.
        name: String,
        /// Underlying error.
        #[source]
        source: RemoteError,
    },

    /// Discord rejected or did not answer a delete request.
    #[error("Failed to delete command `{name}`: {source}")]
    RemoteDeletionFailed {
        /// Command that is still registered.
        name: String,
        /// Underlying error.
        #[source]
        source: RemoteError,
    },

    /// The registered command state could not be written.
    #[error("Failed to persist registered commands: {0}")]
    PersistenceWriteFailed(#[source] StoreError),

    /// The live command list could not be fetched, so no pass was run.
    #[error("Failed to list global commands: {0}")]
    RemoteListFailed(#[source] RemoteError),
}

impl ReconcileError {
    /// Name of the command the error is about, if any.
    pub fn command_name(&self) -> Option<&str> {
        match self {
            Self::DuplicateCommandName { name }
            | Self::RemoteRegistrationFailed { name, .. }
            | Self::RemoteDeletionFailed { name, .. } => Some(name),
            Self::PersistenceWriteFailed(_) | Self::RemoteListFailed(_) => None,
        }
    }
}
