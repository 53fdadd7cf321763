//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::BalancerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Values supplied on the command line or through environment variables.
/// Each one that is set replaces the corresponding file/default value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub servers: Option<Vec<String>>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub strategy: Option<String>,
    pub log_level: Option<String>,
}

impl BalancerConfig {
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(servers) = overrides.servers {
            self.servers = servers;
        }
        if let Some(host) = overrides.host {
            self.listener.host = host;
        }
        if let Some(port) = overrides.port {
            self.listener.port = port;
        }
        if let Some(strategy) = overrides.strategy {
            self.dispatch.strategy = strategy;
        }
        if let Some(level) = overrides.log_level {
            self.observability.log_level = level;
        }
    }
}

/// Parse a TOML configuration document without validating it.
pub fn parse_config(content: &str) -> Result<BalancerConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<BalancerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config = parse_config(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build the effective configuration: file (or defaults), then overrides,
/// then validation.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<BalancerConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            parse_config(&content)?
        }
        None => BalancerConfig::default(),
    };

    config.apply_overrides(overrides);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogFormat;

    #[test]
    fn test_parse_partial_document() {
        let config = parse_config(
            r#"
            servers = ["10.0.0.1:8080", "10.0.0.2:8080"]

            [listener]
            port = 5000

            [dispatch]
            strategy = "least_connections"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.servers.len(), 2);
        assert_eq!(config.listener.port, 5000);
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.dispatch.strategy, "least_connections");
        assert!(config.dispatch.require_flow_id);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.backend_port(), 5000);
    }

    #[test]
    fn test_overrides_win() {
        let mut config = parse_config("servers = [\"10.0.0.1\"]").unwrap();
        config.apply_overrides(ConfigOverrides {
            servers: Some(vec!["10.0.1.1".into(), "10.0.1.2".into()]),
            port: Some(8080),
            strategy: Some("hairpin".into()),
            ..Default::default()
        });

        assert_eq!(config.servers, vec!["10.0.1.1", "10.0.1.2"]);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.dispatch.strategy, "hairpin");
    }

    #[test]
    fn test_resolve_rejects_unknown_strategy() {
        let err = resolve_config(
            None,
            ConfigOverrides {
                strategy: Some("fastest".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("fastest"));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("listener = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
