//! Path templates and their specificity ordering.
//!
//! A template is split on `/` into segments. A segment written exactly as
//! `{name}` is a variable and matches any single non-empty path segment; every
//! other segment is a literal and must match byte for byte. Empty segments are
//! kept, so leading and trailing slashes take part in the comparison.

use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable,
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if raw.len() >= 2 && raw.starts_with('{') && raw.ends_with('}') {
            Segment::Variable
        } else {
            Segment::Literal(raw.to_string())
        }
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            Segment::Literal(literal) => literal == value,
            Segment::Variable => !value.is_empty(),
        }
    }
}

/// A registered route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    raw: String,
    segments: Vec<Segment>,
    /// Indices of variable segments, ascending.
    variables: Vec<usize>,
}

impl Template {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let segments: Vec<Segment> = raw.split('/').map(Segment::parse).collect();
        let variables = segments
            .iter()
            .enumerate()
            .filter(|(_, segment)| **segment == Segment::Variable)
            .map(|(index, _)| index)
            .collect();
        Self {
            raw,
            segments,
            variables,
        }
    }

    /// The template exactly as registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Segment-wise match. Segment counts must agree.
    pub fn matches(&self, path: &RequestPath<'_>) -> bool {
        self.segments.len() == path.segments.len()
            && self
                .segments
                .iter()
                .zip(&path.segments)
                .all(|(segment, value)| segment.matches(value))
    }

    /// Orders two templates by specificity; `Ordering::Less` means `self` is
    /// the more specific one.
    ///
    /// Fewer variables wins. With equal counts the variable positions are
    /// compared pairwise and the template whose variable sits later wins.
    pub fn specificity_cmp(&self, other: &Template) -> Ordering {
        self.variables
            .len()
            .cmp(&other.variables.len())
            .then_with(|| {
                self.variables
                    .iter()
                    .zip(&other.variables)
                    .map(|(mine, theirs)| theirs.cmp(mine))
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(Ordering::Equal)
            })
    }
}

/// A concrete request path split into segments once per lookup.
#[derive(Debug)]
pub struct RequestPath<'a> {
    raw: &'a str,
    segments: Vec<&'a str>,
}

impl<'a> RequestPath<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            segments: raw.split('/').collect(),
        }
    }

    pub fn as_str(&self) -> &'a str {
        self.raw
    }
}

/// Pick the most specific template among those matching `path`.
///
/// Ties that survive [`Template::specificity_cmp`] go to the first candidate
/// in iteration order.
pub fn best_match<'t, I>(candidates: I, path: &RequestPath<'_>) -> Option<&'t Template>
where
    I: IntoIterator<Item = &'t Template>,
{
    candidates
        .into_iter()
        .filter(|template| template.matches(path))
        .fold(None, |best: Option<&Template>, candidate| match best {
            Some(current) if candidate.specificity_cmp(current) != Ordering::Less => Some(current),
            _ => Some(candidate),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn templates(raw: &[&str]) -> Vec<Template> {
        raw.iter().map(|r| Template::parse(*r)).collect()
    }

    fn best<'t>(list: &'t [Template], path: &str) -> Option<&'t str> {
        best_match(list, &RequestPath::new(path)).map(Template::as_str)
    }

    #[test]
    fn test_variable_detection() {
        let template = Template::parse("/path/{id}/test/{num}");
        assert_eq!(template.variable_count(), 2);
        assert_eq!(Template::parse("/v{version}/x").variable_count(), 0);
        assert_eq!(Template::parse("/{}/x").variable_count(), 1);
    }

    #[test]
    fn test_segment_match() {
        let template = Template::parse("/user/{id}");
        assert!(template.matches(&RequestPath::new("/user/42")));
        assert!(!template.matches(&RequestPath::new("/user/")));
        assert!(!template.matches(&RequestPath::new("/user/42/")));
        assert!(!template.matches(&RequestPath::new("/users/42")));
        assert!(!template.matches(&RequestPath::new("/user/42/orders")));
    }

    #[test]
    fn test_fewer_variables_win() {
        let list = templates(&["/{id}/{name}/test", "/path/{id}/test", "/path/{id}/{x}"]);
        assert_eq!(best(&list, "/path/321/test"), Some("/path/{id}/test"));
    }

    #[test]
    fn test_later_variable_wins_on_tie() {
        let list = templates(&["/{hello}/name", "/{hello}/{name}", "/hello/{name}"]);
        assert_eq!(best(&list, "/hello/name"), Some("/hello/{name}"));

        let reordered = templates(&["/{hello}/{name}", "/hello/{name}", "/{hello}/name"]);
        assert_eq!(best(&reordered, "/hello/name"), Some("/hello/{name}"));
    }

    #[test]
    fn test_first_registered_breaks_full_tie() {
        let list = templates(&["/a/{x}", "/a/{y}"]);
        assert_eq!(best(&list, "/a/1"), Some("/a/{x}"));
    }

    #[test]
    fn test_no_match() {
        let list = templates(&["/hello/{name}"]);
        assert_eq!(best(&list, "/hello/a/b"), None);
    }
}
