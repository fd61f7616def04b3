//! Route normalization service.
//!
//! # Responsibilities
//! - Own the catalog, tenant index and on-demand caches
//! - Run the catalog and tenant refresh loops until shutdown
//! - Expose the lookup operations used by ingestion workers
//!
//! # Design Decisions
//! - Constructed explicitly with an injected transport and clock; there is no
//!   process-wide instance
//! - Lookups never fail: refresh and fetch errors are logged and counted, and
//!   the caller gets the input path back in the worst case

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::cache::{ActivityCache, ActivityMatch, EntryRuleCache};
use crate::catalog::{CatalogStore, TenantBinding, TenantIndex};
use crate::clock::{Clock, SystemClock};
use crate::config::{RefreshConfig, ServiceConfig};
use crate::control_plane::{ControlPlaneClient, ControlPlaneResult, Endpoints, HttpTransport, Transport};
use crate::lifecycle::{RefreshLoop, RefreshTarget, Shutdown};
use crate::normalize::normalize_path;
use crate::observability::metrics;
use crate::routing::Resolution;

/// Snapshot of the service state for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub version: &'static str,
    pub catalog_generation: u64,
    pub catalog_apps: usize,
    pub catalog_templates: usize,
    pub cached_matchers: usize,
    pub tenant_bindings: usize,
    pub tenant_lookup_enabled: bool,
    pub entry_rule_cache_entries: usize,
    pub activity_cache_entries: usize,
}

#[derive(Debug)]
pub struct RouteService {
    refresh: RefreshConfig,
    catalog: CatalogStore,
    tenants: TenantIndex,
    entry_rules: EntryRuleCache,
    activities: ActivityCache,
    client: ControlPlaneClient,
}

impl RouteService {
    pub fn new(config: &ServiceConfig, transport: Arc<dyn Transport>, clock: Arc<dyn Clock>) -> Self {
        let client = ControlPlaneClient::new(transport, Endpoints::from(&config.control_plane));
        let caches = &config.caches;

        Self {
            refresh: config.refresh.clone(),
            catalog: CatalogStore::new(),
            tenants: TenantIndex::new(config.tenants.lookup_enabled),
            entry_rules: EntryRuleCache::new(
                client.clone(),
                Duration::from_secs(caches.entry_rule_ttl_secs),
                caches.entry_rule_capacity,
                Arc::clone(&clock),
            ),
            activities: ActivityCache::new(
                client.clone(),
                Duration::from_secs(caches.activity_ttl_secs),
                caches.activity_capacity,
                clock,
            ),
            client,
        }
    }

    /// Production wiring: HTTP transport and the system clock.
    pub fn from_config(config: &ServiceConfig) -> ControlPlaneResult<Self> {
        let transport = HttpTransport::new(&config.control_plane)?;
        tracing::info!(base_url = %transport.base_url(), "Control plane transport ready");
        Ok(Self::new(config, Arc::new(transport), Arc::new(SystemClock)))
    }

    /// Spawn the catalog and tenant refresh loops. Both run their first
    /// refresh immediately and stop when `shutdown` fires.
    pub fn start(self: &Arc<Self>, shutdown: &Shutdown) -> Vec<JoinHandle<()>> {
        [
            (RefreshTarget::Catalog, self.refresh.catalog_interval_secs),
            (RefreshTarget::Tenants, self.refresh.tenant_interval_secs),
        ]
        .into_iter()
        .map(|(target, secs)| {
            let refresh = RefreshLoop::new(Arc::clone(self), target, Duration::from_secs(secs));
            tokio::spawn(refresh.run(shutdown.subscribe()))
        })
        .collect()
    }

    /// Fetch and apply the catalog once. Returns `true` when a new generation
    /// was published.
    pub async fn refresh_catalog(&self) -> bool {
        match self.catalog.refresh(&self.client).await {
            Ok(Some(refresh)) => {
                let snapshot = self.catalog.snapshot();
                tracing::info!(
                    generation = refresh.generation,
                    apps_updated = refresh.apps_updated,
                    rejected_entries = refresh.rejected_entries,
                    apps = snapshot.app_count(),
                    "Route catalog refreshed"
                );
                metrics::record_refresh("catalog", "ok");
                metrics::record_catalog_size(snapshot.app_count(), snapshot.template_count());
                true
            }
            Ok(None) => {
                tracing::warn!("Route catalog response carried no data, keeping current catalog");
                metrics::record_refresh("catalog", "empty");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "Route catalog refresh failed");
                metrics::record_refresh("catalog", e.kind());
                false
            }
        }
    }

    /// Fetch and apply tenant configs once.
    pub async fn refresh_tenants(&self) -> bool {
        match self.tenants.refresh(&self.client).await {
            Ok(Some(refresh)) => {
                tracing::info!(
                    bindings = refresh.bindings,
                    collisions = refresh.collisions,
                    skipped_entries = refresh.skipped_entries,
                    "Tenant configs refreshed"
                );
                metrics::record_refresh("tenants", "ok");
                metrics::record_tenant_bindings(refresh.bindings);
                true
            }
            Ok(None) => {
                tracing::warn!("Tenant config response carried no data, keeping current table");
                metrics::record_refresh("tenants", "empty");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "Tenant config refresh failed");
                metrics::record_refresh("tenants", e.kind());
                false
            }
        }
    }

    /// Canonical route for a request URL against the application catalog.
    ///
    /// The URL is reduced to its path first. Unknown apps and unmatched paths
    /// come back as that path.
    pub fn resolve_route(&self, app_name: &str, method: &str, raw_url: &str) -> String {
        let path = normalize_path(raw_url);
        if path.trim().is_empty() {
            return String::new();
        }

        let Some(matcher) = self.catalog.matcher_for(app_name) else {
            metrics::record_resolution("catalog", "unknown_app");
            return path;
        };

        let resolution = matcher.resolve(method, &path);
        if let Resolution::NoMatch = resolution {
            tracing::debug!(app = app_name, method, path = %path, "No template matched");
        }
        metrics::record_resolution("catalog", resolution.outcome());
        resolution.canonical(&path)
    }

    pub async fn match_entry_rule(
        &self,
        tenant_key: &str,
        env_code: &str,
        app_name: &str,
        path: &str,
        method: &str,
    ) -> String {
        self.entry_rules
            .match_entry_rule(tenant_key, env_code, app_name, path, method)
            .await
    }

    pub async fn match_business_activity(&self, task_id: &str, path: &str, method: &str) -> String {
        self.activities
            .match_business_activity(task_id, path, method)
            .await
    }

    /// Like [`match_business_activity`](Self::match_business_activity) but
    /// also reports the owning application.
    pub async fn find_business_activity(&self, task_id: &str, path: &str, method: &str) -> Option<ActivityMatch> {
        self.activities.find_activity(task_id, path, method).await
    }

    pub fn get_tenant_config(&self, app_name: &str) -> TenantBinding {
        self.tenants.get_tenant_config(app_name)
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn tenants(&self) -> &TenantIndex {
        &self.tenants
    }

    /// Apply the live-reloadable parts of a new configuration.
    pub fn apply_runtime_config(&self, config: &ServiceConfig) {
        self.tenants.set_lookup_enabled(config.tenants.lookup_enabled);
    }

    /// Drop every cached entry-rule and activity list so the next lookup
    /// refetches. Returns how many entries were dropped from each cache.
    pub fn flush_caches(&self) -> (usize, usize) {
        let flushed = (self.entry_rules.len(), self.activities.len());
        self.entry_rules.invalidate_all();
        self.activities.invalidate_all();
        tracing::info!(
            entry_rules = flushed.0,
            activities = flushed.1,
            "On-demand caches flushed"
        );
        flushed
    }

    pub fn status(&self) -> ServiceStatus {
        let snapshot = self.catalog.snapshot();
        ServiceStatus {
            version: env!("CARGO_PKG_VERSION"),
            catalog_generation: snapshot.generation(),
            catalog_apps: snapshot.app_count(),
            catalog_templates: snapshot.template_count(),
            cached_matchers: self.catalog.cached_matchers(),
            tenant_bindings: self.tenants.len(),
            tenant_lookup_enabled: self.tenants.lookup_enabled(),
            entry_rule_cache_entries: self.entry_rules.len(),
            activity_cache_entries: self.activities.len(),
        }
    }
}
