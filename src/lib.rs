//! Podcast database API server.
//!
//! Loads a machine configuration, lazily loads named configuration sources
//! from its search path, and serves a small HTTP API backed by them.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::{ConfigSource, ConfigStore, Settings};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
