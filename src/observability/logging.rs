//! Structured logging.
//!
//! JSON lines in production, human-readable output in development. `RUST_LOG`
//! overrides the mode's default filter.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Operating mode selected by the machine configuration's `production` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Production,
    Development,
}

impl LogMode {
    pub fn from_production(production: bool) -> Self {
        if production {
            LogMode::Production
        } else {
            LogMode::Development
        }
    }

    pub fn default_filter(self) -> &'static str {
        match self {
            LogMode::Production => "podcastdb=info,tower_http=warn",
            LogMode::Development => "podcastdb=debug,tower_http=debug",
        }
    }
}

/// Install the global subscriber.
///
/// Only the first call takes effect; later calls are ignored.
pub fn init(mode: LogMode) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| mode.default_filter().into());
    let registry = tracing_subscriber::registry().with(filter);

    let result = match mode {
        LogMode::Production => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        LogMode::Development => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };

    if result.is_ok() {
        tracing::debug!(?mode, "Logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_production_flag() {
        assert_eq!(LogMode::from_production(true), LogMode::Production);
        assert_eq!(LogMode::from_production(false), LogMode::Development);
        assert!(LogMode::Production.default_filter().contains("podcastdb=info"));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(LogMode::Development);
        init(LogMode::Production);
    }
}
