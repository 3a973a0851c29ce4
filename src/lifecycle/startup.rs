//! Startup orchestration.
//!
//! # Responsibilities
//! - Parse the command line
//! - Load and validate the machine configuration
//! - Start the metrics endpoint when configured
//! - Bind the listener and serve
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Each kind of startup failure has its own exit code so supervisors can
//!   tell them apart

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::{validate_machine, ConfigError, ConfigStore, MachineSettings, ValidationError};
use crate::http::HttpServer;
use crate::observability::metrics;

pub const DEFAULT_CONFIGURATION: &str = "/etc/podcastdb.conf";

#[derive(Debug, Parser)]
#[command(name = "podcastdb", version, about = "Podcast database API server")]
pub struct Args {
    /// Specify the path to the machine level configuration file.
    #[arg(short = 'c', long = "configuration", default_value = DEFAULT_CONFIGURATION)]
    pub configuration: PathBuf,
}

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("error reading configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid machine configuration: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

impl StartupError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            StartupError::Config(_) => 2,
            StartupError::Invalid(_) => 3,
            StartupError::Bind { .. } => 4,
            StartupError::Serve(_) => 5,
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A loaded, validated machine configuration and the store built around it.
pub struct Loaded {
    pub store: Arc<ConfigStore>,
    pub settings: MachineSettings,
}

/// Load the machine configuration at `path` and validate it.
pub fn load(path: &Path) -> Result<Loaded, StartupError> {
    let store = Arc::new(ConfigStore::new());
    let machine = store.set_primary_configuration(path)?;
    let settings = validate_machine(&*machine).map_err(StartupError::Invalid)?;
    Ok(Loaded { store, settings })
}

/// Bind `ip:port` from the settings and serve until shutdown.
pub async fn serve(loaded: Loaded, shutdown: broadcast::Receiver<()>) -> Result<(), StartupError> {
    let Loaded { store, settings } = loaded;

    if let Some(addr) = settings.metrics_address {
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(metrics_address = %addr, error = %e, "Failed to start metrics endpoint");
        }
    }

    let address = settings.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    tracing::info!(address = %address, "Listening for connections");

    HttpServer::new(store, settings)
        .run(listener, shutdown)
        .await
        .map_err(StartupError::Serve)
}
