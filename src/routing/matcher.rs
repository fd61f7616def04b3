//! Per-application route matcher.
//!
//! # Responsibilities
//! - Hold the parsed templates of one application, bucketed by HTTP method
//! - Resolve a concrete path to its canonical template
//!
//! # Design Decisions
//! - Immutable after construction; shared as `Arc<RouteMatcher>` across
//!   ingestion workers without locking
//! - Tagged with the catalog generation it was built from, so a matcher built
//!   from an older snapshot is never served
//! - An empty or missing method bucket falls back to every template of the
//!   application, in registration order

use std::collections::HashMap;

use crate::catalog::AppRoutes;
use crate::routing::template::{best_match, RequestPath, Template};

/// Outcome of resolving one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The path is itself a registered template.
    Exact,
    /// The path matched this template.
    Matched(&'a Template),
    /// Nothing matched.
    NoMatch,
}

impl Resolution<'_> {
    /// Canonical route for `path`: the template on a match, otherwise the path.
    pub fn canonical(&self, path: &str) -> String {
        match self {
            Resolution::Matched(template) => template.as_str().to_string(),
            Resolution::Exact | Resolution::NoMatch => path.to_string(),
        }
    }

    /// Metric label.
    pub fn outcome(&self) -> &'static str {
        match self {
            Resolution::Exact => "exact",
            Resolution::Matched(_) => "matched",
            Resolution::NoMatch => "no_match",
        }
    }
}

/// Resolve `path` against an ordered candidate list: literal membership
/// first, then the specificity-ranked segment match.
pub fn resolve_against<'t, I>(candidates: I, path: &str) -> Resolution<'t>
where
    I: IntoIterator<Item = &'t Template> + Clone,
{
    if candidates
        .clone()
        .into_iter()
        .any(|template| template.as_str() == path)
    {
        return Resolution::Exact;
    }
    match best_match(candidates, &RequestPath::new(path)) {
        Some(template) => Resolution::Matched(template),
        None => Resolution::NoMatch,
    }
}

#[derive(Debug)]
pub struct RouteMatcher {
    generation: u64,
    templates: Vec<Template>,
    by_method: HashMap<String, Vec<usize>>,
}

impl RouteMatcher {
    pub fn new(generation: u64, routes: &AppRoutes) -> Self {
        let mut templates = Vec::with_capacity(routes.template_count());
        let mut by_method: HashMap<String, Vec<usize>> = HashMap::new();

        for (method, paths) in routes.methods() {
            let bucket = by_method.entry(method.to_string()).or_default();
            for path in paths {
                bucket.push(templates.len());
                templates.push(Template::parse(path.as_str()));
            }
        }

        Self {
            generation,
            templates,
            by_method,
        }
    }

    /// Catalog generation this matcher was built from.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    pub fn resolve(&self, method: &str, path: &str) -> Resolution<'_> {
        match self
            .by_method
            .get(&method.to_ascii_uppercase())
            .filter(|bucket| !bucket.is_empty())
        {
            Some(bucket) => resolve_against(bucket.iter().map(|&i| &self.templates[i]), path),
            None => resolve_against(self.templates.iter(), path),
        }
    }
}
