//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::security::AuthTable;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    let config: GatewayConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

impl GatewayConfig {
    /// Build the identity table from the `[auth]` section.
    pub fn auth_table(&self) -> Result<AuthTable, ConfigError> {
        AuthTable::from_config(&self.auth).map_err(|errors| {
            ConfigError::Validation(errors.into_iter().map(ValidationError::Auth).collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::IdentitySource;
    use uuid::Uuid;

    const SAMPLE: &str = r#"
        [listener]
        bind_address = "127.0.0.1:9000"

        [api]
        identity_source = "header"
        prefix = "/upp"

        [dispatch]
        reply_timeout_secs = 0

        [auth]
        "825255ef-a9cf-42e9-8839-ada9a81f99cd" = "1234567890_password"
    "#;

    #[test]
    fn parses_sample_and_fills_defaults() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.api.identity_source, IdentitySource::Header);
        assert_eq!(config.api.prefix, "/upp");
        assert_eq!(config.api.max_body_size, 1024 * 1024);
        assert_eq!(config.dispatch.queue_capacity, 100);
        assert_eq!(config.dispatch.reply_timeout(), None);
        assert_eq!(config.lifecycle.shutdown_grace_secs, 10);

        let table = config.auth_table().unwrap();
        let id = Uuid::parse_str("825255ef-a9cf-42e9-8839-ada9a81f99cd").unwrap();
        assert!(table.contains(&id));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.api.identity_source, IdentitySource::Path);
        assert!(config.auth.is_empty());
    }

    #[test]
    fn syntax_errors_are_parse_errors() {
        assert!(matches!(parse_config("[listener"), Err(ConfigError::Parse(_))));
        assert!(matches!(
            parse_config("[api]\nidentity_source = \"query\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn semantic_errors_are_validation_errors() {
        let err = parse_config("[dispatch]\nqueue_capacity = 0").unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors, vec![ValidationError::ZeroQueueCapacity]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
