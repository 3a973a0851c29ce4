//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! config store and HTTP layer produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (JSON in production, text in development)
//!     → Prometheus scrape endpoint (when metrics.address is set)
//! ```

pub mod logging;
pub mod metrics;
