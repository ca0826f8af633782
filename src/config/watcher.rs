//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::GuardConfig;
use crate::config::SharedConfig;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<GuardConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GuardConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned handle must be kept alive for as long as updates are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(path = ?path, "Config file change detected, reloading");
                        match load_config(&path) {
                            Ok(new_config) => {
                                let _ = tx.send(new_config);
                            }
                            Err(e) => {
                                tracing::error!(
                                    error = %e,
                                    "Failed to reload config, keeping current configuration"
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Swap `update` into `shared` if it only changes hot-reloadable settings.
///
/// The registry, the routes and their middleware state are built once at
/// startup, so a reload may change list contents and secrets but nothing
/// else. Anything more is rejected and the current snapshot is kept.
pub fn apply_update(shared: &SharedConfig, update: GuardConfig) -> bool {
    let current = shared.load();
    let changed = current.restart_required_changes(&update);
    if !changed.is_empty() {
        tracing::error!(
            sections = %changed.join(", "),
            "Reloaded config changes startup-only settings; restart required, keeping current configuration"
        );
        return false;
    }

    shared.store(Arc::new(update));
    tracing::info!(profiles = current.profiles.len(), "Profile lists and secrets reloaded");
    true
}

/// Apply updates from a [`ConfigWatcher`] until its channel closes.
pub async fn apply_updates(shared: SharedConfig, mut updates: mpsc::UnboundedReceiver<GuardConfig>) {
    while let Some(update) = updates.recv().await {
        apply_update(&shared, update);
    }
}
