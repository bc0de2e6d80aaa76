//! Configuration file watching with notify.

use crate::loader::ConfigError;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Signals changes to a configuration file.
///
/// The parent directory is watched so that editors replacing the file
/// through a rename are still noticed.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    changes: mpsc::Receiver<()>,
    debounce: Duration,
}

impl ConfigWatcher {
    /// Starts watching `path`.
    pub fn watch(path: impl AsRef<Path>, debounce: Duration) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file_name = path.file_name().map(ToOwned::to_owned);
        let (tx, rx) = mpsc::channel(16);

        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            match result {
                Ok(event) if touches(&event, file_name.as_ref()) => {
                    debug!(kind = ?event.kind, "Configuration file changed");
                    // A full channel already holds a pending reload.
                    let _ = tx.try_send(());
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Configuration watcher error"),
            }
        })?;

        let directory = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        watcher.watch(directory, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            changes: rx,
            debounce,
        })
    }

    /// Waits for the next change, collapsing bursts within the debounce window.
    ///
    /// Returns `None` once the watcher has shut down.
    pub async fn changed(&mut self) -> Option<()> {
        self.changes.recv().await?;
        tokio::time::sleep(self.debounce).await;
        while self.changes.try_recv().is_ok() {}
        Some(())
    }
}

fn touches(event: &Event, file_name: Option<&OsString>) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == file_name.map(OsString::as_os_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use std::path::PathBuf;

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_touches_matches_file_name() {
        let name = OsString::from("config.yaml");
        assert!(touches(
            &event(EventKind::Modify(ModifyKind::Any), "/etc/bot/config.yaml"),
            Some(&name)
        ));
        assert!(touches(
            &event(EventKind::Create(CreateKind::File), "config.yaml"),
            Some(&name)
        ));
    }

    #[test]
    fn test_touches_ignores_other_files_and_removals() {
        let name = OsString::from("config.yaml");
        assert!(!touches(
            &event(EventKind::Modify(ModifyKind::Any), "/etc/bot/other.yaml"),
            Some(&name)
        ));
        assert!(!touches(
            &event(EventKind::Remove(RemoveKind::File), "/etc/bot/config.yaml"),
            Some(&name)
        ));
    }
}
