//! Machine configuration validation.
//!
//! Returns all validation errors, not just the first, so an operator can
//! fix the file in one pass.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{
    MachineSettings, IP_KEY, METRICS_ADDRESS_KEY, PORT_KEY, PRODUCTION_KEY, REQUEST_TIMEOUT_KEY,
};
use crate::config::settings::Settings;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("'{key}' must be true or false, got '{value}'")]
    InvalidBool { key: &'static str, value: String },

    #[error("'port' must be a number between 0 and 65535, got '{0}'")]
    InvalidPort(String),

    #[error("'{key}' must be a duration such as 30s or 500ms, got '{value}'")]
    InvalidDuration { key: &'static str, value: String },

    #[error("'{0}' must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("'metrics.address' must be a socket address such as 0.0.0.0:9090, got '{0}'")]
    InvalidMetricsAddress(String),
}

/// Derive [`MachineSettings`] from the machine configuration.
///
/// Missing keys take their defaults; keys that are present must parse.
pub fn validate_machine(machine: &impl Settings) -> Result<MachineSettings, Vec<ValidationError>> {
    let defaults = MachineSettings::default();
    let mut errors = Vec::new();

    let production = match machine.get_string(PRODUCTION_KEY) {
        None => defaults.production,
        Some(raw) => machine.get_bool(PRODUCTION_KEY).unwrap_or_else(|| {
            errors.push(ValidationError::InvalidBool {
                key: PRODUCTION_KEY,
                value: raw,
            });
            defaults.production
        }),
    };

    let ip = machine.get_string(IP_KEY).unwrap_or(defaults.ip);

    let port = match machine.get_string(PORT_KEY) {
        None => defaults.port,
        Some(raw) => raw.trim().parse::<u16>().unwrap_or_else(|_| {
            errors.push(ValidationError::InvalidPort(raw));
            defaults.port
        }),
    };

    let request_timeout = match machine.get_string(REQUEST_TIMEOUT_KEY) {
        None => defaults.request_timeout,
        Some(raw) => match machine.get_duration(REQUEST_TIMEOUT_KEY) {
            Some(timeout) if timeout.is_zero() => {
                errors.push(ValidationError::ZeroDuration(REQUEST_TIMEOUT_KEY));
                defaults.request_timeout
            }
            Some(timeout) => timeout,
            None => {
                errors.push(ValidationError::InvalidDuration {
                    key: REQUEST_TIMEOUT_KEY,
                    value: raw,
                });
                defaults.request_timeout
            }
        },
    };

    let metrics_address = match machine.get_string(METRICS_ADDRESS_KEY) {
        None => None,
        Some(raw) if raw.trim().is_empty() => None,
        Some(raw) => match raw.trim().parse::<SocketAddr>() {
            Ok(addr) => Some(addr),
            Err(_) => {
                errors.push(ValidationError::InvalidMetricsAddress(raw));
                None
            }
        },
    };

    if errors.is_empty() {
        Ok(MachineSettings {
            production,
            ip,
            port,
            request_timeout,
            metrics_address,
        })
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::properties;
    use crate::config::source::Document;
    use std::time::Duration;

    fn machine(text: &str) -> Document {
        Document::new(properties::parse(text).unwrap())
    }

    #[test]
    fn test_defaults_for_empty_machine() {
        let settings = validate_machine(&machine("")).unwrap();
        assert_eq!(settings, MachineSettings::default());
    }

    #[test]
    fn test_full_machine() {
        let settings = validate_machine(&machine(
            "production=true\nip=127.0.0.1\nport=8081\nhttp.request_timeout=5s\nmetrics.address=127.0.0.1:9090\n",
        ))
        .unwrap();

        assert!(settings.production);
        assert_eq!(settings.bind_address(), "127.0.0.1:8081");
        assert_eq!(settings.request_timeout, Duration::from_secs(5));
        assert_eq!(settings.metrics_address, Some("127.0.0.1:9090".parse().unwrap()));
    }

    #[test]
    fn test_all_errors_reported() {
        let errors = validate_machine(&machine(
            "production=maybe\nport=http\nhttp.request_timeout=soon\nmetrics.address=nowhere\n",
        ))
        .unwrap_err();

        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::InvalidPort("http".into())));
        assert!(errors.contains(&ValidationError::InvalidMetricsAddress("nowhere".into())));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let errors = validate_machine(&machine("http.request_timeout=0s\n")).unwrap_err();
        assert_eq!(errors, vec![ValidationError::ZeroDuration(REQUEST_TIMEOUT_KEY)]);
    }
}
