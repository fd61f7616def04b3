//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, ports valid, capacities > 0)
//! - Check that addresses parse and endpoint paths are absolute
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem with a configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check every field; collect all problems.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let cp = &config.control_plane;

    if cp.scheme != "http" && cp.scheme != "https" {
        errors.push(ValidationError::new(
            "control_plane.scheme",
            format!("expected http or https, got '{}'", cp.scheme),
        ));
    }
    if cp.host.trim().is_empty() {
        errors.push(ValidationError::new("control_plane.host", "must not be empty"));
    }
    if cp.port == 0 {
        errors.push(ValidationError::new("control_plane.port", "must be non-zero"));
    }
    for (field, path) in [
        ("control_plane.catalog_path", &cp.catalog_path),
        ("control_plane.tenant_config_path", &cp.tenant_config_path),
        ("control_plane.entry_rules_path", &cp.entry_rules_path),
        ("control_plane.activities_path", &cp.activities_path),
    ] {
        if !path.starts_with('/') {
            errors.push(ValidationError::new(field, format!("'{path}' must start with '/'")));
        }
    }

    for (field, value) in [
        ("control_plane.request_timeout_secs", cp.request_timeout_secs),
        ("refresh.catalog_interval_secs", config.refresh.catalog_interval_secs),
        ("refresh.tenant_interval_secs", config.refresh.tenant_interval_secs),
        ("caches.entry_rule_ttl_secs", config.caches.entry_rule_ttl_secs),
        ("caches.activity_ttl_secs", config.caches.activity_ttl_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than zero"));
        }
    }

    for (field, value) in [
        ("caches.entry_rule_capacity", config.caches.entry_rule_capacity),
        ("caches.activity_capacity", config.caches.activity_capacity),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than zero"));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if config.admin.enabled {
        if config.admin.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::new(
                "admin.bind_address",
                format!("'{}' is not a socket address", config.admin.bind_address),
            ));
        }
        if config.admin.api_key.trim().is_empty() {
            errors.push(ValidationError::new("admin.api_key", "must not be empty"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
