//! Business activities per stress-test task.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::cache::ttl::TtlCache;
use crate::clock::Clock;
use crate::control_plane::{ActivityDefinition, ControlPlaneClient};
use crate::observability::metrics;
use crate::routing::{best_match, RequestPath, Template};

const CACHE_NAME: &str = "activities";

/// A parsed activity definition.
#[derive(Debug, Clone)]
pub struct ActivityRule {
    pub template: Template,
    /// Upper-cased; `None` only matters for non-virtual rules, which then
    /// never match.
    pub method: Option<String>,
    pub is_virtual: bool,
    pub application_name: Option<String>,
}

impl ActivityRule {
    /// `None` for definitions without a route pattern.
    pub fn from_definition(definition: ActivityDefinition) -> Option<Self> {
        let pattern = definition.service_name.filter(|p| !p.is_empty())?;
        Some(Self {
            template: Template::parse(pattern),
            method: definition.method_name.map(|m| m.trim().to_ascii_uppercase()),
            is_virtual: definition.is_virtual,
            application_name: definition.application_name.filter(|a| !a.trim().is_empty()),
        })
    }

    fn accepts_method(&self, method: &str) -> bool {
        self.is_virtual
            || self
                .method
                .as_deref()
                .is_some_and(|m| m.eq_ignore_ascii_case(method.trim()))
    }
}

/// Matched activity with its owning application, when the definition names one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityMatch {
    pub route: String,
    pub application_name: Option<String>,
}

#[derive(Debug)]
pub struct ActivityCache {
    activities: TtlCache<String, Arc<Vec<ActivityRule>>>,
    client: ControlPlaneClient,
}

impl ActivityCache {
    pub fn new(client: ControlPlaneClient, ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            activities: TtlCache::new(ttl, capacity, clock),
            client,
        }
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn invalidate_all(&self) {
        self.activities.invalidate_all();
        metrics::record_cache_size(CACHE_NAME, 0);
    }

    /// Canonical route for `path` among the task's activities, or `path`.
    pub async fn match_business_activity(&self, task_id: &str, path: &str, method: &str) -> String {
        match self.find_activity(task_id, path, method).await {
            Some(found) => found.route,
            None => path.to_string(),
        }
    }

    /// Best matching activity for `path`. Virtual activities ignore the method.
    pub async fn find_activity(&self, task_id: &str, path: &str, method: &str) -> Option<ActivityMatch> {
        let Some(rules) = self.rules_for(task_id).await else {
            metrics::record_resolution(CACHE_NAME, "no_rules");
            return None;
        };

        let request = RequestPath::new(path);
        let candidates = rules.iter().filter(|rule| rule.accepts_method(method));
        // A pattern spelled exactly like the path outranks every other match.
        let best = candidates
            .clone()
            .map(|rule| &rule.template)
            .find(|template| template.as_str() == path)
            .or_else(|| best_match(candidates.clone().map(|rule| &rule.template), &request));

        let found = best.and_then(|template| {
            candidates
                .into_iter()
                .find(|rule| std::ptr::eq(&rule.template, template))
                .map(|rule| ActivityMatch {
                    route: template.as_str().to_string(),
                    application_name: rule.application_name.clone(),
                })
        });

        tracing::debug!(task_id, method, path, matched = found.is_some(), "Activity lookup");
        metrics::record_resolution(CACHE_NAME, if found.is_some() { "matched" } else { "no_match" });
        found
    }

    async fn rules_for(&self, task_id: &str) -> Option<Arc<Vec<ActivityRule>>> {
        let key = task_id.to_string();
        if let Some(rules) = self.activities.get(&key) {
            metrics::record_cache_lookup(CACHE_NAME, true);
            return Some(rules);
        }
        metrics::record_cache_lookup(CACHE_NAME, false);

        let definitions = match self.client.fetch_activities(task_id).await {
            Ok(definitions) => definitions,
            Err(e) => {
                tracing::warn!(task_id, error = %e, "Business activity fetch failed");
                metrics::record_refresh(CACHE_NAME, e.kind());
                return None;
            }
        };

        if definitions.is_empty() {
            metrics::record_refresh(CACHE_NAME, "empty");
            return None;
        }

        let total = definitions.len();
        let rules: Vec<ActivityRule> = definitions
            .into_iter()
            .filter_map(ActivityRule::from_definition)
            .collect();
        if rules.len() < total {
            tracing::warn!(task_id, skipped = total - rules.len(), "Skipping activities without a route pattern");
        }

        let rules = Arc::new(rules);
        self.activities.insert(key, Arc::clone(&rules));
        metrics::record_refresh(CACHE_NAME, "ok");
        metrics::record_cache_size(CACHE_NAME, self.activities.len());
        Some(rules)
    }
}
