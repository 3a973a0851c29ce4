//! Shared fixtures for integration tests.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use podcastdb::config::{validate_machine, ConfigStore};
use podcastdb::http::HttpServer;
use podcastdb::lifecycle::Shutdown;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// A temporary configuration directory holding a machine file.
pub struct Fixture {
    pub dir: TempDir,
    pub machine: PathBuf,
}

impl Fixture {
    /// Write `podcastdb.conf` with `body`, plus a `configuration.path` line
    /// pointing at the fixture directory when `with_search_path` is set.
    pub fn new(body: &str, with_search_path: bool) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let machine = dir.path().join("podcastdb.conf");

        let mut contents = body.to_string();
        if with_search_path {
            contents.push_str(&format!("configuration.path = {}\n", dir.path().display()));
        }
        fs::write(&machine, contents).unwrap();

        Self { dir, machine }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }
}

/// Start a server for `fixture` on an ephemeral port.
#[allow(dead_code)]
pub async fn start_server(fixture: &Fixture) -> (SocketAddr, Shutdown, Arc<ConfigStore>) {
    let store = Arc::new(ConfigStore::new());
    let machine = store.set_primary_configuration(&fixture.machine).unwrap();
    let settings = validate_machine(&*machine).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(store.clone(), settings);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown, store)
}

#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// Poll `check` until it returns true or `timeout` elapses.
#[allow(dead_code)]
pub async fn eventually<F>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    check()
}
