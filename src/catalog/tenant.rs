//! Application → tenant/environment index.
//!
//! The table keeps refreshing in the background while the public accessor is
//! gated by a flag. With the flag off (the default) every lookup answers the
//! fixed `default#test` binding.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;

use crate::control_plane::{ControlPlaneClient, ControlPlaneResult, TenantConfigEntry};

pub const DEFAULT_TENANT_KEY: &str = "default";
pub const DEFAULT_ENV_CODE: &str = "test";
/// Environment forced onto applications that appear more than once in a pass.
pub const COLLISION_ENV_CODE: &str = "test";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantBinding {
    pub tenant_key: String,
    pub env_code: String,
}

impl TenantBinding {
    pub fn new(tenant_key: impl Into<String>, env_code: impl Into<String>) -> Self {
        Self {
            tenant_key: tenant_key.into(),
            env_code: env_code.into(),
        }
    }

    pub fn fallback() -> Self {
        Self::new(DEFAULT_TENANT_KEY, DEFAULT_ENV_CODE)
    }
}

impl fmt::Display for TenantBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.tenant_key, self.env_code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantRefresh {
    pub bindings: usize,
    pub collisions: usize,
    pub skipped_entries: usize,
}

#[derive(Debug, Default)]
pub struct TenantIndex {
    bindings: ArcSwap<HashMap<String, TenantBinding>>,
    lookup_enabled: AtomicBool,
}

impl TenantIndex {
    pub fn new(lookup_enabled: bool) -> Self {
        Self {
            bindings: ArcSwap::default(),
            lookup_enabled: AtomicBool::new(lookup_enabled),
        }
    }

    pub fn lookup_enabled(&self) -> bool {
        self.lookup_enabled.load(Ordering::Relaxed)
    }

    pub fn set_lookup_enabled(&self, enabled: bool) {
        let previous = self.lookup_enabled.swap(enabled, Ordering::Relaxed);
        if previous != enabled {
            tracing::info!(enabled, "Tenant lookup flag changed");
        }
    }

    /// Tenant and environment for `app`. Answers the fixed default while the
    /// lookup flag is off, and for unknown apps when it is on.
    pub fn get_tenant_config(&self, app: &str) -> TenantBinding {
        if !self.lookup_enabled() {
            return TenantBinding::fallback();
        }
        self.binding(app).unwrap_or_else(TenantBinding::fallback)
    }

    /// Raw live-table read, ignoring the flag.
    pub fn binding(&self, app: &str) -> Option<TenantBinding> {
        self.bindings.load().get(app).cloned()
    }

    pub fn len(&self) -> usize {
        self.bindings.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch tenant configs and apply them. `Ok(None)` when the response had
    /// no `data`.
    pub async fn refresh(&self, client: &ControlPlaneClient) -> ControlPlaneResult<Option<TenantRefresh>> {
        let entries = client.fetch_tenant_configs().await?;
        Ok(entries.map(|entries| self.apply(&entries)))
    }

    /// Overlay one pass of tenant configs onto the current table.
    ///
    /// An application seen more than once during the pass is rebound to
    /// `<tenant>#test`, using the tenant of its last repeated occurrence.
    pub fn apply(&self, entries: &[TenantConfigEntry]) -> TenantRefresh {
        let mut pass: Vec<(String, TenantBinding)> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut repeated: HashMap<&str, &str> = HashMap::new();
        let mut skipped_entries = 0;

        for entry in entries {
            let (Some(tenant_key), Some(env_app_map)) = (&entry.tenant_app_key, &entry.env_app_map) else {
                skipped_entries += 1;
                continue;
            };
            for (env_code, apps) in env_app_map {
                for app in apps.iter().flatten() {
                    if !seen.insert(app.as_str()) {
                        repeated.insert(app.as_str(), tenant_key.as_str());
                    }
                    pass.push((app.clone(), TenantBinding::new(tenant_key, env_code)));
                }
            }
        }

        if !repeated.is_empty() {
            tracing::warn!(
                apps = ?repeated.keys().collect::<Vec<_>>(),
                "Applications bound more than once, forcing env '{}'",
                COLLISION_ENV_CODE
            );
        }

        let collisions = repeated.len();
        self.bindings.rcu(|current| {
            let mut table = HashMap::clone(current);
            for (app, binding) in &pass {
                table.insert(app.clone(), binding.clone());
            }
            for (app, tenant_key) in &repeated {
                table.insert(app.to_string(), TenantBinding::new(*tenant_key, COLLISION_ENV_CODE));
            }
            Arc::new(table)
        });

        TenantRefresh {
            bindings: self.len(),
            collisions,
            skipped_entries,
        }
    }
}
