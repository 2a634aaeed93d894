//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check addresses parse and the upstream endpoint is a usable URL
//! - Validate value ranges (timeouts > 0, limits > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a valid socket address")]
    BindAddress(String),

    #[error("upstream.endpoint must not be empty")]
    EmptyEndpoint,

    #[error("upstream.endpoint {0:?} is not a valid URL: {1}")]
    Endpoint(String, url::ParseError),

    #[error("upstream.endpoint {0:?} must use http or https")]
    EndpointScheme(String),

    #[error("upstream.endpoint {0:?} has no version segment to strip")]
    EndpointVersion(String),

    #[error("timeouts.{0} must be greater than zero")]
    Timeout(&'static str),

    #[error("limits.max_body_bytes must be greater than zero")]
    BodyLimit,

    #[error("observability.metrics_address {0:?} is not a valid socket address")]
    MetricsAddress(String),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let endpoint = config.upstream.endpoint.trim_end_matches('/');
    if endpoint.is_empty() {
        errors.push(ValidationError::EmptyEndpoint);
    } else {
        match Url::parse(endpoint) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    errors.push(ValidationError::EndpointScheme(endpoint.to_string()));
                } else if url.path() == "/" || url.path().is_empty() {
                    // The forwarding base is the endpoint minus its final path
                    // segment; an endpoint without one cannot be stripped.
                    errors.push(ValidationError::EndpointVersion(endpoint.to_string()));
                }
            }
            Err(e) => errors.push(ValidationError::Endpoint(endpoint.to_string(), e)),
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Timeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Timeout("request_secs"));
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::BodyLimit);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
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
    fn default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.upstream.endpoint = "".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn rejects_endpoint_without_version_segment() {
        let mut config = GatewayConfig::default();
        config.upstream.endpoint = "https://graph.microsoft.com".into();

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::EndpointVersion(_)));
    }

    #[test]
    fn rejects_non_http_scheme() {
        let mut config = GatewayConfig::default();
        config.upstream.endpoint = "ftp://example.com/v1.0".into();

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::EndpointScheme(_)));
    }
}
