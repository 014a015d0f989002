//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (capacities and timeouts > 0, addresses parse)
//! - Check that every auth entry names a real UUID with a usable token
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::security::{AuthError, AuthTable};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("api.prefix {0:?} must be empty or start with '/' and not end with '/'")]
    InvalidPrefix(String),

    #[error("api.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("dispatch.queue_capacity must be greater than zero")]
    ZeroQueueCapacity,

    #[error("timeouts.body_read_secs must be greater than zero")]
    ZeroBodyReadTimeout,

    #[error("TLS file {0:?} does not exist")]
    MissingTlsFile(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if let Some(tls) = &config.listener.tls {
        for path in [&tls.cert_path, &tls.key_path] {
            if !Path::new(path).exists() {
                errors.push(ValidationError::MissingTlsFile(path.clone()));
            }
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if !is_valid_prefix(&config.api.prefix) {
        errors.push(ValidationError::InvalidPrefix(config.api.prefix.clone()));
    }

    if config.api.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.dispatch.queue_capacity == 0 {
        errors.push(ValidationError::ZeroQueueCapacity);
    }

    if config.timeouts.body_read_secs == 0 {
        errors.push(ValidationError::ZeroBodyReadTimeout);
    }

    if let Err(auth_errors) = AuthTable::from_config(&config.auth) {
        errors.extend(auth_errors.into_iter().map(ValidationError::Auth));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_valid_prefix(prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    prefix.starts_with('/')
        && !prefix.ends_with('/')
        && !prefix.contains(['{', '}', '*'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn reports_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "localhost".into();
        config.dispatch.queue_capacity = 0;
        config.timeouts.body_read_secs = 0;
        config.api.prefix = "upp/".into();
        config.auth.insert("nope".into(), "token".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::InvalidBindAddress("localhost".into())));
        assert!(errors.contains(&ValidationError::ZeroQueueCapacity));
        assert!(errors.contains(&ValidationError::ZeroBodyReadTimeout));
        assert!(errors.contains(&ValidationError::InvalidPrefix("upp/".into())));
        assert!(errors.contains(&ValidationError::Auth(AuthError::InvalidIdentity {
            key: "nope".into()
        })));
    }

    #[test]
    fn metrics_address_only_checked_when_enabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::InvalidMetricsAddress("bogus".into())])
        );
    }

    #[test]
    fn prefix_shapes() {
        assert!(is_valid_prefix(""));
        assert!(is_valid_prefix("/upp"));
        assert!(is_valid_prefix("/api/v1"));
        assert!(!is_valid_prefix("/"));
        assert!(!is_valid_prefix("upp"));
        assert!(!is_valid_prefix("/upp/"));
        assert!(!is_valid_prefix("/{id}"));
    }

    #[test]
    fn missing_tls_files_are_reported() {
        let mut config = GatewayConfig::default();
        config.listener.tls = Some(crate::config::schema::TlsConfig {
            cert_path: "/nonexistent/cert.pem".into(),
            key_path: "/nonexistent/key.pem".into(),
        });
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
