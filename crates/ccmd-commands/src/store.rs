//! Persistence of the registered command set.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

/// Names of the commands this bot believes it has registered with Discord.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredCommands {
    #[serde(rename = "registered_commands", default)]
    names: BTreeSet<String>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl RegisteredCommands {
    /// Creates a set from the given names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            updated_at: None,
        }
    }

    /// The registered names.
    pub const fn names(&self) -> &BTreeSet<String> {
        &self.names
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Records `name`, returning whether it was new.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    /// Forgets `name`, returning whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        self.names.remove(name)
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// When the set was last saved.
    pub const fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Stamps the set with a save time.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}

/// Errors reading or writing persisted state.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// I/O error on the state file.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// State file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The state file is not valid JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The blocking write task panicked or was cancelled.
    #[error("State write task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Durable storage for [`RegisteredCommands`].
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Loads the set, empty on first run.
    async fn load(&self) -> Result<RegisteredCommands, StoreError>;

    /// Replaces the stored set.
    async fn save(&self, state: &RegisteredCommands) -> Result<(), StoreError>;
}

/// Stores state as a JSON file, written atomically.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store for the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn load(&self) -> Result<RegisteredCommands, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No registered command state yet, starting empty");
                Ok(RegisteredCommands::default())
            }
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    async fn save(&self, state: &RegisteredCommands) -> Result<(), StoreError> {
        let content = serde_json::to_vec_pretty(state)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomically(&path, &content)).await??;

        debug!(path = %self.path.display(), registered = state.len(), "Saved registered command state");
        Ok(())
    }
}

fn write_atomically(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    let io_error = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory).map_err(io_error)?;

    let mut file = tempfile::NamedTempFile::new_in(directory).map_err(io_error)?;
    file.write_all(content).map_err(io_error)?;
    file.as_file().sync_all().map_err(io_error)?;
    file.persist(path).map_err(|e| io_error(e.error))?;
    Ok(())
}

/// Keeps state in memory and counts saves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<RegisteredCommands>,
    saves: AtomicUsize,
}

impl MemoryStore {
    /// Creates a store holding `state`.
    pub fn new(state: RegisteredCommands) -> Self {
        Self {
            state: Mutex::new(state),
            saves: AtomicUsize::new(0),
        }
    }

    /// The last saved state.
    pub fn snapshot(&self) -> RegisteredCommands {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of completed saves.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> Result<RegisteredCommands, StoreError> {
        Ok(self.snapshot())
    }

    async fn save(&self, state: &RegisteredCommands) -> Result<(), StoreError> {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
