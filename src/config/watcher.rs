//! File watcher for hot reload of secondary sources.

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::{Arc, Weak};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::ConfigError;
use crate::config::source::ConfigSource;
use crate::observability::metrics;

/// Quiet period after an event before the file is re-read.
///
/// Writers commonly truncate then write, which shows up as several events.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Watches the file behind one [`ConfigSource`] and republishes it on change.
///
/// The watcher task is the only writer of the source's document.
pub struct ConfigWatcher {
    source: Weak<ConfigSource>,
    dir: PathBuf,
    file_name: OsString,
}

impl ConfigWatcher {
    pub fn new(source: &Arc<ConfigSource>) -> Self {
        let path = source.path();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Self {
            source: Arc::downgrade(source),
            dir,
            file_name: path.file_name().map(OsString::from).unwrap_or_default(),
        }
    }

    /// Install the filesystem watch and spawn the reload task.
    ///
    /// The watch is active when this returns. The task, and the watch with
    /// it, ends once the source has been dropped.
    pub fn run(self) -> Result<(), notify::Error> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = event_tx.send(res);
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        // The directory, not the file: editors that save via rename replace
        // the inode and would silently end a file watch.
        watcher.watch(&self.dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %self.dir.join(&self.file_name).display(), "Config watcher started");
        tokio::spawn(self.reload_loop(watcher, event_rx));
        Ok(())
    }

    async fn reload_loop(
        self,
        _watcher: RecommendedWatcher,
        mut events: mpsc::UnboundedReceiver<notify::Result<Event>>,
    ) {
        while let Some(res) = events.recv().await {
            match res {
                Ok(event) if self.is_relevant(&event) => {}
                Ok(_) => continue,
                Err(e) => {
                    tracing::error!("Watch error: {:?}", e);
                    continue;
                }
            }

            tokio::time::sleep(DEBOUNCE).await;
            while events.try_recv().is_ok() {}

            let Some(source) = self.source.upgrade() else {
                break;
            };

            tracing::info!(source = %source.name(), "Config file change detected, reloading...");
            let reloading = source.clone();
            let result = tokio::task::spawn_blocking(move || reloading.reload())
                .await
                .unwrap_or_else(|e| Err(ConfigError::from(e)));
            match result {
                Ok(()) => {
                    metrics::record_config_reload(source.name(), "ok");
                    tracing::info!(source = %source.name(), "Configuration reloaded");
                }
                Err(e) => {
                    metrics::record_config_reload(source.name(), "error");
                    tracing::error!(
                        source = %source.name(),
                        "Failed to reload config: {}. Keeping current configuration.",
                        e
                    );
                }
            }
        }

        tracing::debug!(path = %self.dir.join(&self.file_name).display(), "Config watcher stopped");
    }

    fn is_relevant(&self, event: &Event) -> bool {
        (event.kind.is_modify() || event.kind.is_create())
            && event
                .paths
                .iter()
                .any(|p| p.file_name() == Some(self.file_name.as_os_str()))
    }
}

/// Convenience for [`ConfigWatcher::new`] followed by [`ConfigWatcher::run`].
pub fn watch(source: &Arc<ConfigSource>) -> Result<(), notify::Error> {
    ConfigWatcher::new(source).run()
}
