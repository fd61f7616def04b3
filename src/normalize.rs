//! URL normalization.
//!
//! # Responsibilities
//! - Reduce a raw request URL to its path component
//! - Extract the `scheme://host` origin of a URL
//!
//! # Design Decisions
//! - Fail open: anything that does not parse as an absolute URL is returned
//!   unchanged, so already-normalized paths pass straight through
//! - No allocation beyond the returned string; no logging on the hot path

use url::Url;

/// Parse `raw` as an absolute URL that has a path hierarchy.
fn parse_absolute(raw: &str) -> Option<Url> {
    Url::parse(raw).ok().filter(|url| !url.cannot_be_a_base())
}

/// Split the raw text of an absolute URL into its authority and the rest
/// (path, query and fragment). The text is taken as written: no percent
/// encoding and no dot-segment removal.
fn split_raw(raw: &str) -> Option<(&str, &str)> {
    let (_, rest) = raw.trim().split_once(':')?;
    let rest = rest.strip_prefix("//")?;
    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    Some(rest.split_at(authority_end))
}

/// Return only the path of `raw`, dropping scheme, host, query and fragment.
/// The path is returned exactly as written in `raw`.
///
/// Blank, relative or unparseable input is returned as-is.
pub fn normalize_path(raw: &str) -> String {
    if raw.trim().is_empty() {
        return raw.to_string();
    }
    let Some(url) = parse_absolute(raw) else {
        return raw.to_string();
    };
    match split_raw(raw) {
        Some((_, tail)) => {
            let path = &tail[..tail.find(['?', '#']).unwrap_or(tail.len())];
            if path.is_empty() {
                "/".to_string()
            } else {
                path.to_string()
            }
        }
        None => url.path().to_string(),
    }
}

/// Return `scheme://host` for `raw`. The port and any user info are dropped
/// and a URL without a host yields an empty host. The host keeps its
/// original spelling.
///
/// Blank or unparseable input is returned as-is.
pub fn normalize_origin(raw: &str) -> String {
    if raw.trim().is_empty() {
        return raw.to_string();
    }
    let Some(url) = parse_absolute(raw) else {
        return raw.to_string();
    };
    let host = match split_raw(raw) {
        Some((authority, _)) => raw_host(authority),
        None => url.host_str().unwrap_or(""),
    };
    format!("{}://{}", url.scheme(), host)
}

fn raw_host(authority: &str) -> &str {
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    if host_port.starts_with('[') {
        return host_port.find(']').map_or(host_port, |end| &host_port[..=end]);
    }
    host_port.split_once(':').map_or(host_port, |(host, _)| host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_strips_host_and_query() {
        assert_eq!(
            normalize_path("http://svc.internal:8080/user/123?verbose=1#top"),
            "/user/123"
        );
        assert_eq!(normalize_path("https://example.com"), "/");
    }

    #[test]
    fn test_path_fails_open() {
        assert_eq!(normalize_path("/user/123"), "/user/123");
        assert_eq!(normalize_path("not a url"), "not a url");
        assert_eq!(normalize_path("mailto:ops@example.com"), "mailto:ops@example.com");
        assert_eq!(normalize_path(""), "");
        assert_eq!(normalize_path("   "), "   ");
    }

    #[test]
    fn test_path_is_idempotent() {
        for raw in [
            "http://a.b/c/d?x=1",
            "https://host:443/",
            "/already/a/path",
            "file:///var/log/app.log",
        ] {
            let once = normalize_path(raw);
            assert_eq!(normalize_path(&once), once, "input {raw}");
        }
    }

    #[test]
    fn test_origin() {
        assert_eq!(
            normalize_origin("http://svc.internal:8080/user/123?x=1"),
            "http://svc.internal"
        );
        assert_eq!(normalize_origin("file:///tmp/x"), "file://");
        assert_eq!(normalize_origin("http://ops:pw@Svc.Internal:80/x"), "http://Svc.Internal");
        assert_eq!(normalize_origin("http://[::1]:8080/x"), "http://[::1]");
        assert_eq!(normalize_origin("/relative/path"), "/relative/path");
        assert_eq!(normalize_origin(""), "");
    }

    #[test]
    fn test_path_kept_as_written() {
        assert_eq!(normalize_path("http://h:8080/订单/42"), "/订单/42");
        assert_eq!(normalize_path("http://h:8080/a b/42?q=1"), "/a b/42");
        assert_eq!(normalize_path("http://h:8080/x/../y/1"), "/x/../y/1");
        assert_eq!(normalize_path("http://h:8080/a%20b/42"), "/a%20b/42");
        assert_eq!(normalize_path("http://h:8080?q=1"), "/");
        assert_eq!(normalize_path("http://h:8080#frag"), "/");
    }
}
