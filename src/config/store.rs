//! Keyed registry of loaded configuration sources.

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::config::loader::{self, ConfigError};
use crate::config::settings::Settings;
use crate::config::source::ConfigSource;
use crate::config::watcher;
use crate::observability::metrics;

/// Registry name of the machine configuration.
pub const MACHINE: &str = "machine";

type Slot = Arc<OnceCell<Arc<ConfigSource>>>;

/// Loads named configuration sources at most once and hands out shared
/// references to them.
///
/// One store is built at startup and shared via `Arc` with everything that
/// reads configuration. The machine configuration must be set before any
/// other source can be found, since it carries the search path.
///
/// Each name maps to a once-cell, so concurrent first lookups of the same
/// name share one load. A failed load leaves the cell empty and the next
/// lookup tries again.
#[derive(Default)]
pub struct ConfigStore {
    machine: ArcSwapOption<ConfigSource>,
    registry: DashMap<String, Slot>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the machine configuration from an exact path.
    ///
    /// `.conf` files are read as `key=value` properties. On success the
    /// source replaces any earlier machine configuration, both as the
    /// primary handle and as the `machine` registry entry. On failure
    /// nothing changes. The machine configuration is never watched.
    pub fn set_primary_configuration(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Arc<ConfigSource>, ConfigError> {
        let path = path.as_ref();
        let machine = match loader::load_machine(MACHINE, path) {
            Ok(source) => Arc::new(source),
            Err(e) => {
                metrics::record_config_load(MACHINE, "error");
                return Err(e);
            }
        };
        metrics::record_config_load(MACHINE, "ok");

        self.machine.store(Some(machine.clone()));
        self.registry
            .insert(MACHINE.to_string(), Arc::new(OnceCell::from(machine.clone())));

        tracing::info!(path = %path.display(), format = %machine.format(), "Machine configuration loaded");
        Ok(machine)
    }

    /// The current machine configuration, if one has been set.
    pub fn primary(&self) -> Option<Arc<ConfigSource>> {
        self.machine.load_full()
    }

    /// Whether the machine configuration declares `production = true`.
    pub fn is_production(&self) -> bool {
        self.primary()
            .and_then(|m| m.get_bool("production"))
            .unwrap_or(false)
    }

    /// Return the source registered as `name`, loading it on first use.
    ///
    /// Sources are searched for in the machine configuration's
    /// `configuration.path`. Outside production, a freshly loaded source is
    /// watched and reloaded when its file changes.
    pub async fn get_configuration(&self, name: &str) -> Result<Arc<ConfigSource>, ConfigError> {
        if let Some(source) = self.cached(name) {
            return Ok(source);
        }

        // Clone the slot out so no shard lock is held across the load.
        let slot: Slot = self.registry.entry(name.to_string()).or_default().clone();
        let source = slot.get_or_try_init(|| self.load(name)).await?;
        Ok(source.clone())
    }

    /// Names with a loaded source, sorted.
    pub fn loaded(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .registry
            .iter()
            .filter(|entry| entry.value().initialized())
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    fn cached(&self, name: &str) -> Option<Arc<ConfigSource>> {
        self.registry.get(name)?.get().cloned()
    }

    async fn load(&self, name: &str) -> Result<Arc<ConfigSource>, ConfigError> {
        let machine = self.primary().ok_or(ConfigError::NoPrimary)?;
        let dirs = loader::search_path(&*machine);
        let production = machine.get_bool("production").unwrap_or(false);

        let owned = name.to_string();
        let loaded = tokio::task::spawn_blocking(move || loader::load_named(&owned, &dirs)).await?;
        let source = match loaded {
            Ok(source) => Arc::new(source),
            Err(e) => {
                metrics::record_config_load(name, "error");
                tracing::warn!(source = %name, error = %e, "Failed to load configuration");
                return Err(e);
            }
        };
        metrics::record_config_load(name, "ok");

        if !production {
            if let Err(e) = watcher::watch(&source) {
                tracing::warn!(source = %name, error = %e, "Failed to watch configuration; changes will not be picked up");
            }
        }

        tracing::info!(source = %name, path = %source.path().display(), watched = !production, "Configuration loaded");
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn machine_conf(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("podcastdb.conf");
        fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn test_lookup_without_machine_fails() {
        let store = ConfigStore::new();
        let err = store.get_configuration("strings-en").await.unwrap_err();
        assert!(matches!(err, ConfigError::NoPrimary));
        assert!(store.loaded().is_empty());
    }

    #[tokio::test]
    async fn test_machine_is_registered() {
        let dir = tempfile::tempdir().unwrap();
        let path = machine_conf(dir.path(), "production=true\nport=8080\n");

        let store = ConfigStore::new();
        let machine = store.set_primary_configuration(&path).unwrap();

        let via_registry = store.get_configuration(MACHINE).await.unwrap();
        assert!(Arc::ptr_eq(&machine, &via_registry));
        assert!(store.is_production());
        assert_eq!(store.loaded(), vec![MACHINE.to_string()]);
    }

    #[tokio::test]
    async fn test_failed_machine_load_keeps_previous() {
        let dir = tempfile::tempdir().unwrap();
        let good = machine_conf(dir.path(), "port=8080\n");

        let store = ConfigStore::new();
        assert!(store
            .set_primary_configuration(dir.path().join("missing.conf"))
            .is_err());
        assert!(store.primary().is_none());

        store.set_primary_configuration(&good).unwrap();
        assert!(store
            .set_primary_configuration(dir.path().join("missing.conf"))
            .is_err());
        assert_eq!(store.primary().unwrap().get_int("port"), Some(8080));
    }

    #[tokio::test]
    async fn test_later_machine_replaces_earlier() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.conf");
        let b = dir.path().join("b.conf");
        fs::write(&a, "port=1\n").unwrap();
        fs::write(&b, "port=2\n").unwrap();

        let store = ConfigStore::new();
        let first = store.set_primary_configuration(&a).unwrap();
        let second = store.set_primary_configuration(&b).unwrap();

        let primary = store.primary().unwrap();
        let registered = store.get_configuration(MACHINE).await.unwrap();
        assert!(Arc::ptr_eq(&primary, &second));
        assert!(Arc::ptr_eq(&registered, &second));
        assert!(!Arc::ptr_eq(&registered, &first));
        assert_eq!(registered.get_int("port"), Some(2));
    }

    #[tokio::test]
    async fn test_failed_lookup_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let path = machine_conf(
            dir.path(),
            &format!("production=true\nconfiguration.path={}\n", dir.path().display()),
        );

        let store = ConfigStore::new();
        store.set_primary_configuration(&path).unwrap();

        let err = store.get_configuration("strings-en").await.unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));

        fs::write(dir.path().join("strings-en.yaml"), "helloworld-message: hi\n").unwrap();
        let source = store.get_configuration("strings-en").await.unwrap();
        assert_eq!(source.get_string("helloworld-message").as_deref(), Some("hi"));
    }
}
