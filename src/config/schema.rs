//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the route normalizer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Control plane endpoints.
    pub control_plane: ControlPlaneConfig,

    /// Background refresh periods.
    pub refresh: RefreshConfig,

    /// On-demand cache sizing.
    pub caches: CacheConfig,

    /// Tenant lookup gating.
    pub tenants: TenantLookupConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

/// Where the control plane lives and which paths serve each document.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlPlaneConfig {
    /// `http` or `https`.
    pub scheme: String,

    pub host: String,

    pub port: u16,

    /// Application route catalog (`{app: ["path#METHOD"]}`).
    pub catalog_path: String,

    /// Tenant/environment application mapping.
    pub tenant_config_path: String,

    /// Tenant-scoped entry rules.
    pub entry_rules_path: String,

    /// Business activities by report id.
    pub activities_path: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl ControlPlaneConfig {
    /// `scheme://host:port`, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "127.0.0.1".to_string(),
            port: 10010,
            catalog_path: "/api/routes/catalog".to_string(),
            tenant_config_path: "/api/tenants/config".to_string(),
            entry_rules_path: "/api/routes/entries".to_string(),
            activities_path: "/api/activities".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Background refresh configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Catalog refresh period in seconds.
    pub catalog_interval_secs: u64,

    /// Tenant mapping refresh period in seconds.
    pub tenant_interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            catalog_interval_secs: 120,
            tenant_interval_secs: 300,
        }
    }
}

/// TTL and capacity of the on-demand caches.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub entry_rule_ttl_secs: u64,
    pub entry_rule_capacity: usize,
    pub activity_ttl_secs: u64,
    pub activity_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            entry_rule_ttl_secs: 300,
            entry_rule_capacity: 10_000,
            activity_ttl_secs: 600,
            activity_capacity: 1_000,
        }
    }
}

/// Tenant lookup gating.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TenantLookupConfig {
    /// Serve live tenant bindings instead of the fixed default.
    /// Hot-reloadable.
    pub lookup_enabled: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config.refresh.catalog_interval_secs, 120);
        assert_eq!(config.refresh.tenant_interval_secs, 300);
        assert_eq!(config.caches.entry_rule_capacity, 10_000);
        assert_eq!(config.caches.activity_ttl_secs, 600);
        assert!(!config.tenants.lookup_enabled);
        assert!(!config.admin.enabled);
    }

    #[test]
    fn test_partial_section() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [control_plane]
            host = "tro.internal"
            port = 8080

            [tenants]
            lookup_enabled = true
            "#,
        )
        .unwrap();
        assert_eq!(config.control_plane.base_url(), "http://tro.internal:8080");
        assert_eq!(config.control_plane.catalog_path, "/api/routes/catalog");
        assert!(config.tenants.lookup_enabled);
    }
}
