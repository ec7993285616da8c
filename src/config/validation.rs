//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile every path pattern once to surface regex errors at startup
//! - Validate value shapes (addresses, URLs, prefixes, timeouts)
//! - Check auth mode prerequisites
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use url::Url;

use crate::config::schema::{AuthMode, RouterConfig};
use crate::routing::matcher::PathPattern;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("tenancy.root_domain must not be empty")]
    EmptyRootDomain,

    #[error("tenancy.root_domain must be a bare host, got {0:?}")]
    RootDomainNotBareHost(String),

    #[error("tenancy.preview_suffixes contains an empty entry")]
    EmptyPreviewSuffix,

    #[error("tenancy.rewrite_prefix must start with '/' and not end with '/', got {0:?}")]
    InvalidRewritePrefix(String),

    #[error("{field} pattern {pattern:?} does not compile: {reason}")]
    InvalidPattern {
        field: &'static str,
        pattern: String,
        reason: String,
    },

    #[error("{field} is not a socket address: {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("listener.default_scheme must be http or https, got {0:?}")]
    InvalidScheme(String),

    #[error("upstream.tenant_header is not a valid header name: {0:?}")]
    InvalidHeaderName(String),

    #[error("auth.mode = \"bearer\" requires at least one token")]
    MissingTokens,

    #[error("auth.mode = \"remote\" requires auth.verify_url")]
    MissingVerifyUrl,

    #[error("{field} is not a valid URL: {value:?}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_tenancy(config, &mut errors);
    validate_patterns(config, &mut errors);

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if !matches!(config.listener.default_scheme.as_str(), "http" | "https") {
        errors.push(ValidationError::InvalidScheme(
            config.listener.default_scheme.clone(),
        ));
    }

    if config.upstream.address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "upstream.address",
            value: config.upstream.address.clone(),
        });
    }
    if HeaderName::from_bytes(config.upstream.tenant_header.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidHeaderName(
            config.upstream.tenant_header.clone(),
        ));
    }

    validate_auth(config, &mut errors);

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_tenancy(config: &RouterConfig, errors: &mut Vec<ValidationError>) {
    let root = config.tenancy.root_domain.trim();
    if root.is_empty() {
        errors.push(ValidationError::EmptyRootDomain);
    } else if root.contains("://") || root.contains('/') {
        errors.push(ValidationError::RootDomainNotBareHost(root.to_string()));
    }

    if config.tenancy.preview_suffixes.iter().any(|s| s.is_empty()) {
        errors.push(ValidationError::EmptyPreviewSuffix);
    }

    let prefix = &config.tenancy.rewrite_prefix;
    if !prefix.starts_with('/') || prefix.ends_with('/') {
        errors.push(ValidationError::InvalidRewritePrefix(prefix.clone()));
    }
}

fn validate_patterns(config: &RouterConfig, errors: &mut Vec<ValidationError>) {
    let sets: [(&'static str, &Vec<String>); 4] = [
        ("paths.public", &config.paths.public),
        ("paths.internal_assets", &config.paths.internal_assets),
        ("paths.bypass", &config.paths.bypass),
        ("paths.bypass_exceptions", &config.paths.bypass_exceptions),
    ];

    for (field, patterns) in sets {
        for pattern in patterns {
            if let Err(e) = PathPattern::new(pattern) {
                errors.push(ValidationError::InvalidPattern {
                    field,
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
}

fn validate_auth(config: &RouterConfig, errors: &mut Vec<ValidationError>) {
    let auth = &config.auth;
    match auth.mode {
        AuthMode::Disabled => {}
        AuthMode::Bearer => {
            if auth.tokens.iter().all(|t| t.is_empty()) {
                errors.push(ValidationError::MissingTokens);
            }
        }
        AuthMode::Remote => match &auth.verify_url {
            None => errors.push(ValidationError::MissingVerifyUrl),
            Some(url) if Url::parse(url).is_err() => errors.push(ValidationError::InvalidUrl {
                field: "auth.verify_url",
                value: url.clone(),
            }),
            Some(_) => {}
        },
    }

    if let Some(url) = &auth.sign_in_url {
        if Url::parse(url).is_err() {
            errors.push(ValidationError::InvalidUrl {
                field: "auth.sign_in_url",
                value: url.clone(),
            });
        }
    }

    if auth.mode == AuthMode::Remote && auth.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("auth.timeout_secs"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&RouterConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RouterConfig::default();
        config.tenancy.root_domain = "https://example.com".into();
        config.tenancy.rewrite_prefix = "s/".into();
        config.paths.public.push("/broken(".into());
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::RootDomainNotBareHost(
            "https://example.com".into()
        )));
        assert!(errors.contains(&ValidationError::ZeroTimeout("timeouts.request_secs")));
    }

    #[test]
    fn test_auth_prerequisites() {
        let mut config = RouterConfig::default();
        config.auth.mode = AuthMode::Bearer;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::MissingTokens])
        );

        config.auth.mode = AuthMode::Remote;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::MissingVerifyUrl])
        );

        config.auth.verify_url = Some("http://127.0.0.1:9000/verify".into());
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_root_domain_with_port_is_valid() {
        let mut config = RouterConfig::default();
        config.tenancy.root_domain = "example.test:8443".into();
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = RouterConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert_eq!(validate_config(&config), Ok(()));

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::InvalidAddress {
                field: "observability.metrics_address",
                value: "nowhere".into(),
            }])
        );
    }
}
