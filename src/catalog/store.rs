//! Application route catalog.
//!
//! # Responsibilities
//! - Hold `app → method → ordered templates` as an immutable snapshot
//! - Apply catalog documents fetched from the control plane
//! - Own the per-app matcher cache and invalidate it on every refresh
//!
//! # Design Decisions
//! - Copy-on-write: a refresh clones the app map (values are `Arc`s), replaces
//!   the apps present in the document and publishes the result with a single
//!   `ArcSwap` store. Readers never see a half-applied app.
//! - Apps missing from a document keep their previous routes
//! - Every published snapshot carries a new generation; matchers are tagged
//!   with the generation they were built from and rebuilt on mismatch, so a
//!   lookup racing a refresh never serves routes from two generations

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;

use crate::control_plane::types::CatalogDocument;
use crate::control_plane::{ControlPlaneClient, ControlPlaneResult};
use crate::routing::RouteMatcher;

/// Templates of one application grouped by HTTP method, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppRoutes {
    methods: Vec<(String, Vec<String>)>,
}

impl AppRoutes {
    /// Register `path` under `method` (upper-cased).
    pub fn push(&mut self, method: &str, path: &str) {
        let method = method.trim().to_ascii_uppercase();
        match self.methods.iter_mut().find(|(m, _)| *m == method) {
            Some((_, paths)) => paths.push(path.to_string()),
            None => self.methods.push((method, vec![path.to_string()])),
        }
    }

    /// Build from `"path#METHOD"` entries. Malformed entries are returned
    /// separately so the caller can report them.
    pub fn from_entries<'a, I>(entries: I) -> (Self, Vec<&'a str>)
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut routes = Self::default();
        let mut rejected = Vec::new();
        for entry in entries {
            let mut parts = entry.split('#');
            match (parts.next(), parts.next()) {
                (Some(path), Some(method)) if !path.is_empty() && !method.trim().is_empty() => {
                    routes.push(method, path)
                }
                _ => rejected.push(entry.as_str()),
            }
        }
        (routes, rejected)
    }

    pub fn methods(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.methods
            .iter()
            .map(|(method, paths)| (method.as_str(), paths.as_slice()))
    }

    pub fn template_count(&self) -> usize {
        self.methods.iter().map(|(_, paths)| paths.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.template_count() == 0
    }
}

/// One published state of the catalog.
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    generation: u64,
    apps: HashMap<String, Arc<AppRoutes>>,
}

impl CatalogSnapshot {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn app(&self, name: &str) -> Option<&Arc<AppRoutes>> {
        self.apps.get(name)
    }

    pub fn app_count(&self) -> usize {
        self.apps.len()
    }

    pub fn template_count(&self) -> usize {
        self.apps.values().map(|routes| routes.template_count()).sum()
    }
}

/// Result of applying one catalog document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRefresh {
    pub generation: u64,
    pub apps_updated: usize,
    pub rejected_entries: usize,
}

#[derive(Debug, Default)]
pub struct CatalogStore {
    snapshot: ArcSwap<CatalogSnapshot>,
    matchers: DashMap<String, Arc<RouteMatcher>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.snapshot.load_full()
    }

    pub fn cached_matchers(&self) -> usize {
        self.matchers.len()
    }

    /// Fetch the catalog and apply it. `Ok(None)` when the response had no
    /// `data`; the store is untouched on `Err`.
    pub async fn refresh(&self, client: &ControlPlaneClient) -> ControlPlaneResult<Option<CatalogRefresh>> {
        let document = client.fetch_catalog().await?;
        Ok(document.map(|document| self.apply(document)))
    }

    /// Replace every app present in `document`, publish a new generation, then
    /// drop all cached matchers.
    pub fn apply(&self, document: CatalogDocument) -> CatalogRefresh {
        let mut incoming = HashMap::with_capacity(document.len());
        let mut rejected_entries = 0;

        for (app, entries) in document {
            let Some(entries) = entries else {
                tracing::warn!(app = %app, "Catalog entry without route list, keeping previous routes");
                continue;
            };
            let (routes, rejected) = AppRoutes::from_entries(&entries);
            if !rejected.is_empty() {
                tracing::warn!(app = %app, rejected = ?rejected, "Skipping malformed catalog entries");
                rejected_entries += rejected.len();
            }
            incoming.insert(app, Arc::new(routes));
        }

        let apps_updated = incoming.len();
        let published = self.snapshot.rcu(|current| {
            let mut apps = current.apps.clone();
            apps.extend(incoming.iter().map(|(app, routes)| (app.clone(), Arc::clone(routes))));
            CatalogSnapshot {
                generation: current.generation + 1,
                apps,
            }
        });
        // `rcu` hands back the snapshot it replaced.
        let generation = published.generation + 1;

        self.matchers.clear();

        CatalogRefresh {
            generation,
            apps_updated,
            rejected_entries,
        }
    }

    /// Matcher for `app` built from the current generation, or `None` when the
    /// app has no templates.
    pub fn matcher_for(&self, app: &str) -> Option<Arc<RouteMatcher>> {
        let snapshot = self.snapshot.load();
        let routes = snapshot.app(app).filter(|routes| !routes.is_empty())?;

        let cached = self.matchers.get(app).map(|entry| Arc::clone(entry.value()));
        if let Some(matcher) = cached.filter(|m| m.generation() == snapshot.generation) {
            return Some(matcher);
        }

        let matcher = Arc::new(RouteMatcher::new(snapshot.generation, routes));
        if self.snapshot.load().generation == snapshot.generation {
            self.matchers.insert(app.to_string(), Arc::clone(&matcher));
        }
        Some(matcher)
    }
}
