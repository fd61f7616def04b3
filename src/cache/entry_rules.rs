//! Tenant-scoped entry rules.
//!
//! Rule lists are fetched on demand per `(tenant, env, app)` and kept for the
//! configured TTL. Only non-empty successful fetches are cached, so an app
//! whose rules are not registered yet is asked again on the next call.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::ttl::TtlCache;
use crate::clock::Clock;
use crate::control_plane::ControlPlaneClient;
use crate::observability::metrics;
use crate::routing::{resolve_against, Template};

const CACHE_NAME: &str = "entry_rules";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleKey {
    pub tenant_key: String,
    pub env_code: String,
    pub app_name: String,
}

impl RuleKey {
    pub fn new(tenant_key: &str, env_code: &str, app_name: &str) -> Self {
        Self {
            tenant_key: tenant_key.to_string(),
            env_code: env_code.to_string(),
            app_name: app_name.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct EntryRuleCache {
    rules: TtlCache<RuleKey, Arc<Vec<Template>>>,
    client: ControlPlaneClient,
}

impl EntryRuleCache {
    pub fn new(client: ControlPlaneClient, ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            rules: TtlCache::new(ttl, capacity, clock),
            client,
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn invalidate_all(&self) {
        self.rules.invalidate_all();
        metrics::record_cache_size(CACHE_NAME, 0);
    }

    /// Canonical route for `path` under the tenant's rules for `app_name`.
    /// Rules apply to every method; `method` is only logged.
    pub async fn match_entry_rule(
        &self,
        tenant_key: &str,
        env_code: &str,
        app_name: &str,
        path: &str,
        method: &str,
    ) -> String {
        let key = RuleKey::new(tenant_key, env_code, app_name);
        let Some(rules) = self.rules_for(key).await else {
            metrics::record_resolution(CACHE_NAME, "no_rules");
            return path.to_string();
        };

        let resolution = resolve_against(rules.iter(), path);
        tracing::debug!(
            tenant_key,
            env_code,
            app = app_name,
            method,
            path,
            outcome = resolution.outcome(),
            "Entry rule lookup"
        );
        metrics::record_resolution(CACHE_NAME, resolution.outcome());
        resolution.canonical(path)
    }

    /// Cached rule list, fetching on a miss. `None` when nothing usable came
    /// back.
    pub async fn rules_for(&self, key: RuleKey) -> Option<Arc<Vec<Template>>> {
        if let Some(rules) = self.rules.get(&key) {
            metrics::record_cache_lookup(CACHE_NAME, true);
            return Some(rules);
        }
        metrics::record_cache_lookup(CACHE_NAME, false);

        let fetched = self
            .client
            .fetch_entry_rules(&key.tenant_key, &key.env_code, &key.app_name)
            .await;
        let patterns = match fetched {
            Ok(patterns) => patterns,
            Err(e) => {
                tracing::warn!(
                    tenant_key = %key.tenant_key,
                    env_code = %key.env_code,
                    app = %key.app_name,
                    error = %e,
                    "Entry rule fetch failed"
                );
                metrics::record_refresh(CACHE_NAME, e.kind());
                return None;
            }
        };

        if patterns.is_empty() {
            metrics::record_refresh(CACHE_NAME, "empty");
            return None;
        }

        let rules: Arc<Vec<Template>> = Arc::new(patterns.into_iter().map(Template::parse).collect());
        self.rules.insert(key, Arc::clone(&rules));
        metrics::record_refresh(CACHE_NAME, "ok");
        metrics::record_cache_size(CACHE_NAME, self.rules.len());
        Some(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::ControlPlaneConfig;
    use crate::control_plane::{Endpoints, ScriptedTransport};

    const PATH: &str = "/api/routes/entries";

    fn setup() -> (EntryRuleCache, Arc<ScriptedTransport>, Arc<ManualClock>) {
        let transport = Arc::new(ScriptedTransport::new());
        let clock = Arc::new(ManualClock::new());
        let client = ControlPlaneClient::new(
            transport.clone(),
            Endpoints::from(&ControlPlaneConfig::default()),
        );
        let cache = EntryRuleCache::new(client, Duration::from_secs(300), 100, clock.clone());
        (cache, transport, clock)
    }

    #[tokio::test]
    async fn test_matches_and_caches() {
        let (cache, transport, _clock) = setup();
        transport.respond(PATH, r#"{"data": {"shop": ["/order/{id}", "/order/list"]}}"#);

        let route = cache.match_entry_rule("acme", "prod", "shop", "/order/42", "GET").await;
        assert_eq!(route, "/order/{id}");
        let route = cache.match_entry_rule("acme", "prod", "shop", "/order/list", "POST").await;
        assert_eq!(route, "/order/list");

        assert_eq!(transport.calls_to(PATH), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_expired_rules_are_refetched() {
        let (cache, transport, clock) = setup();
        transport.respond(PATH, r#"{"data": {"shop": ["/order/{id}"]}}"#);

        cache.match_entry_rule("acme", "prod", "shop", "/order/1", "GET").await;
        clock.advance(Duration::from_secs(300));
        cache.match_entry_rule("acme", "prod", "shop", "/order/1", "GET").await;

        assert_eq!(transport.calls_to(PATH), 2);
    }

    #[tokio::test]
    async fn test_empty_result_not_cached() {
        let (cache, transport, _clock) = setup();
        transport.respond(PATH, r#"{"data": {"other": ["/x"]}}"#);

        let route = cache.match_entry_rule("acme", "prod", "shop", "/order/1", "GET").await;
        assert_eq!(route, "/order/1");
        cache.match_entry_rule("acme", "prod", "shop", "/order/1", "GET").await;

        assert_eq!(transport.calls_to(PATH), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_returns_path() {
        let (cache, transport, _clock) = setup();
        transport.fail(PATH, "connection refused");

        let route = cache.match_entry_rule("acme", "prod", "shop", "/order/1", "GET").await;
        assert_eq!(route, "/order/1");
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_keys_are_tenant_scoped() {
        let (cache, transport, _clock) = setup();
        transport.respond(PATH, r#"{"data": {"shop": ["/order/{id}"]}}"#);

        cache.match_entry_rule("acme", "prod", "shop", "/order/1", "GET").await;
        cache.match_entry_rule("acme", "staging", "shop", "/order/1", "GET").await;
        cache.match_entry_rule("globex", "prod", "shop", "/order/1", "GET").await;

        assert_eq!(transport.calls_to(PATH), 3);
        assert_eq!(cache.len(), 3);
    }
}
