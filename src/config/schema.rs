//! Typed view of the machine configuration.
//!
//! The machine file is free-form key/value text; the server only needs a
//! handful of its keys. [`MachineSettings`] is what startup derives from it
//! once [`validate_machine`](crate::config::validation::validate_machine)
//! has accepted the values.

use std::net::SocketAddr;
use std::time::Duration;

pub const PRODUCTION_KEY: &str = "production";
pub const IP_KEY: &str = "ip";
pub const PORT_KEY: &str = "port";
pub const REQUEST_TIMEOUT_KEY: &str = "http.request_timeout";
pub const METRICS_ADDRESS_KEY: &str = "metrics.address";

/// Server settings taken from the machine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineSettings {
    /// Quiet logging, no file watching.
    pub production: bool,

    /// Interface to bind. Empty means all interfaces.
    pub ip: String,

    pub port: u16,

    /// Upper bound on handling one request.
    pub request_timeout: Duration,

    /// Prometheus scrape endpoint, if enabled.
    pub metrics_address: Option<SocketAddr>,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            production: false,
            ip: String::new(),
            port: 8080,
            request_timeout: Duration::from_secs(30),
            metrics_address: None,
        }
    }
}

impl MachineSettings {
    /// `ip:port` for the listener; IPv6 literals are bracketed.
    pub fn bind_address(&self) -> String {
        let ip = self.ip.trim();
        if ip.is_empty() {
            format!("0.0.0.0:{}", self.port)
        } else if ip.contains(':') && !ip.starts_with('[') {
            format!("[{}]:{}", ip, self.port)
        } else {
            format!("{}:{}", ip, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let mut settings = MachineSettings::default();
        assert_eq!(settings.bind_address(), "0.0.0.0:8080");

        settings.ip = "127.0.0.1".into();
        settings.port = 9000;
        assert_eq!(settings.bind_address(), "127.0.0.1:9000");

        settings.ip = "::1".into();
        assert_eq!(settings.bind_address(), "[::1]:9000");
    }
}
