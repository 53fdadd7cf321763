//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the backend list and strategy name
//! - Validate value ranges (timeouts > 0, queues present)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::BalancerConfig;
use crate::load_balancer::{BackendSetError, DispatchError, Strategy};
use crate::load_balancer::backend::BackendSet;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("servers: {0}")]
    Servers(BackendSetError),

    #[error("dispatch.strategy: {0}")]
    Strategy(DispatchError),

    #[error("pipeline.rss_queues must not be empty")]
    EmptyRssQueues,

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("observability.metrics_address '{0}' is not a valid socket address")]
    MetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = BackendSet::new(&config.servers) {
        errors.push(ValidationError::Servers(e));
    }

    if let Err(e) = config.dispatch.strategy.parse::<Strategy>() {
        errors.push(ValidationError::Strategy(e));
    }

    if config.pipeline.rss_queues.is_empty() {
        errors.push(ValidationError::EmptyRssQueues);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }
    if config.timeouts.provision_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("provision_ms"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&BalancerConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = BalancerConfig::default();
        config.servers = vec!["10.0.0.1".into(), "10.0.0.1".into()];
        config.dispatch.strategy = "random".into();
        config.pipeline.rss_queues.clear();
        config.timeouts.provision_ms = 0;
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "not-an-addr".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::Servers(BackendSetError::Duplicate("10.0.0.1".into())),
                ValidationError::Strategy(DispatchError::UnknownStrategy("random".into())),
                ValidationError::EmptyRssQueues,
                ValidationError::ZeroTimeout("provision_ms"),
                ValidationError::MetricsAddress("not-an-addr".into()),
            ]
        );
    }

    #[test]
    fn test_empty_server_list() {
        let mut config = BalancerConfig::default();
        config.servers.clear();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::Servers(BackendSetError::Empty)]);

        // errors are reported by value to the loader
        let copied = errors.clone();
        assert_eq!(copied[0].to_string(), errors[0].to_string());
    }
}
