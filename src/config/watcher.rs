//! Configuration file watcher for hot reload.
//!
//! The parent directory is watched rather than the file itself: editors and
//! deployment tools usually replace the file by rename, which would orphan a
//! watch on the original inode.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{parse_config, ConfigError};
use crate::config::schema::ServiceConfig;

/// Watches one configuration file and forwards every valid new version.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<ServiceConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ServiceConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tracker = ReloadTracker::new(self.path.clone());
        let tx = self.update_tx;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = (event.kind.is_modify() || event.kind.is_create())
                        && tracker.concerns(&event.paths);
                    if !relevant {
                        return;
                    }
                    match tracker.reload() {
                        Ok(Some(config)) => {
                            tracing::info!(path = ?tracker.path, "Configuration reloaded");
                            let _ = tx.send(config);
                        }
                        Ok(None) => {}
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to reload config, keeping current configuration")
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&directory, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Remembers the last applied file contents so repeated events for one save
/// produce a single update.
#[derive(Debug)]
struct ReloadTracker {
    path: PathBuf,
    file_name: Option<OsString>,
    last_contents: Option<String>,
}

impl ReloadTracker {
    fn new(path: PathBuf) -> Self {
        let last_contents = std::fs::read_to_string(&path).ok();
        Self {
            file_name: path.file_name().map(|name| name.to_os_string()),
            path,
            last_contents,
        }
    }

    fn concerns(&self, paths: &[PathBuf]) -> bool {
        paths
            .iter()
            .any(|p| p.file_name().map(|n| n.to_os_string()) == self.file_name)
    }

    /// `Ok(None)` when the contents did not change since the last reload.
    fn reload(&mut self) -> Result<Option<ServiceConfig>, ConfigError> {
        let contents = std::fs::read_to_string(&self.path)?;
        if self.last_contents.as_deref() == Some(contents.as_str()) {
            return Ok(None);
        }
        let config = parse_config(&contents)?;
        self.last_contents = Some(contents);
        Ok(Some(config))
    }
}
