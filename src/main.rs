//! podcastdb server
//!
//! ```text
//!   -c /etc/podcastdb.conf
//!          │
//!          ▼
//!   ┌──────────────┐  configuration.path   ┌─────────────────────┐
//!   │ machine conf │──────────────────────▶│ strings-en.yaml ... │
//!   └──────┬───────┘                       └──────────┬──────────┘
//!          │ ip, port, production                     │ lazy, cached, watched
//!          ▼                                          ▼
//!   ┌──────────────┐   GET /hello          ┌─────────────────────┐
//!   │  HTTP server │──────────────────────▶│    ConfigStore      │
//!   └──────────────┘                       └─────────────────────┘
//! ```

use std::process::ExitCode;

use clap::Parser;

use podcastdb::lifecycle::startup::{self, Args};
use podcastdb::lifecycle::Shutdown;
use podcastdb::observability::logging::{self, LogMode};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let loaded = match startup::load(&args.configuration) {
        Ok(loaded) => loaded,
        Err(e) => {
            logging::init(LogMode::Development);
            tracing::error!(
                path = %args.configuration.display(),
                error = %e,
                "Error reading configuration. Exiting..."
            );
            return ExitCode::from(e.exit_code());
        }
    };

    logging::init(LogMode::from_production(loaded.settings.production));

    tracing::info!("podcastdb v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        path = %args.configuration.display(),
        bind_address = %loaded.settings.bind_address(),
        production = loaded.settings.production,
        request_timeout = ?loaded.settings.request_timeout,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    match startup::serve(loaded, shutdown.subscribe()).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::from(e.exit_code())
        }
    }
}
