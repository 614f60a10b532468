// src/crawl/normalize.rs
// =============================================================================
// URL canonicalization and validity checks.
//
// Every URL the crawler meets goes through here before it is allowed near the
// frontier:
// - normalize(): the identity key used for "have we been here already?"
// - is_well_formed(): does it even look like a web address?
// - is_crawlable(): is it an HTML page on the site we are crawling?
// - resolve(): turn an href (maybe relative) into an absolute URL
//
// Rust concepts:
// - Newtype pattern: NormalizedUrl wraps a String so it can't be mixed up
//   with a raw, un-normalized URL by accident
// - Url: For parsing, joining, and comparing hosts
// =============================================================================

use serde::Serialize;
use std::fmt;
use url::Url;

/// Schemes that point at something other than a web page.
const BLOCKED_SCHEMES: &[&str] = &["mailto:", "javascript:", "tel:", "sms:", "whatsapp:"];

/// Canonical identity of a URL for visitation dedup.
///
/// Two URLs that differ only in case, trailing slashes, or fragment map to
/// the same NormalizedUrl.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Canonicalizes a URL
//
// Steps, in order:
//   1. drop everything from the first '#'
//   2. drop trailing slashes
//   3. lower-case the whole string
//
// Example:
//   "HTTP://Example.com/Page/#team" -> "http://example.com/page"
pub fn normalize(url: &str) -> NormalizedUrl {
    let without_fragment = match url.find('#') {
        Some(index) => &url[..index],
        None => url,
    };

    // All trailing slashes go, not just one, so normalize(normalize(u)) is
    // always the same as normalize(u)
    let trimmed = without_fragment.trim_end_matches('/');

    NormalizedUrl(trimmed.to_lowercase())
}

/// True iff the URL parses and has both a scheme and a host.
pub fn is_well_formed(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => !parsed.scheme().is_empty() && parsed.host_str().map_or(false, |h| !h.is_empty()),
        Err(_) => false,
    }
}

// Decides whether a URL is worth fetching as part of this crawl
//
// Parameters:
//   url: absolute URL to check
//   base_domain: host of the seed URL; anything else is off-site
//   excluded_extensions: file extensions that are never HTML (pdf, png, ...)
//
// Returns false for:
//   - bare fragments ("#", "#top")
//   - mailto:, javascript:, tel:, sms:, whatsapp:
//   - anything that isn't http(s)
//   - other hosts (subdomains count as other hosts)
//   - documents, archives, images, audio and video files
pub fn is_crawlable(url: &str, base_domain: &str, excluded_extensions: &[&str]) -> bool {
    let url = url.trim();
    if url.is_empty() || url.starts_with('#') {
        return false;
    }

    let lowered = url.to_ascii_lowercase();
    if BLOCKED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        return false;
    }

    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return false;
    }

    match parsed.host_str() {
        Some(host) if host.eq_ignore_ascii_case(base_domain) => {}
        _ => return false,
    }

    !has_excluded_extension(parsed.path(), excluded_extensions)
}

// Looks at the last path segment only, so "/v1.2/about" isn't mistaken
// for a file with extension "2/about"
fn has_excluded_extension(path: &str, excluded_extensions: &[&str]) -> bool {
    let last_segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");

    match last_segment.rsplit_once('.') {
        Some((_, extension)) => {
            let extension = extension.to_ascii_lowercase();
            excluded_extensions.iter().any(|excluded| *excluded == extension)
        }
        None => false,
    }
}

// Resolves a link (possibly relative) to an absolute URL without fragment
//
// Examples:
//   base = "https://example.com/team/"
//   href = "jane" -> Some("https://example.com/team/jane")
//   href = "/contact#form" -> Some("https://example.com/contact")
pub fn resolve(base: &Url, href: &str) -> Option<String> {
    let mut joined = base.join(href.trim()).ok()?;
    joined.set_fragment(None);
    Some(joined.to_string())
}

/// Host of a URL, lower-cased by the url crate. None if the URL has no host.
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(str::to_string)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a newtype instead of a plain String?
//    - NormalizedUrl(String) costs nothing at runtime
//    - But the compiler now refuses to put a raw URL where a normalized
//      one is expected, which is exactly the mistake dedup code makes
//    - #[serde(transparent)] serializes it as the inner string
//
// 2. What does trim_end_matches do?
//    - Removes the pattern repeatedly from the end of the string
//    - "a///".trim_end_matches('/') == "a"
//
// 3. What is map_or?
//    - Option::map_or(default, f) returns default for None,
//      or f(value) for Some(value)
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EXCLUDED_EXTENSIONS;

    #[test]
    fn test_normalize_ignores_case_fragment_and_slash() {
        assert_eq!(
            normalize("HTTP://Example.com/Page/#x"),
            normalize("http://example.com/Page")
        );
        assert_eq!(normalize("https://example.com/").as_str(), "https://example.com");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in [
            "HTTPS://Example.COM/About/",
            "https://example.com//#frag/",
            "https://example.com/a/b/?q=1#x",
            "",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(once.as_str()), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_well_formed() {
        assert!(is_well_formed("https://example.com"));
        assert!(is_well_formed("http://example.com/path?x=1"));
        assert!(!is_well_formed("example.com"));
        assert!(!is_well_formed("mailto:jane@example.com"));
        assert!(!is_well_formed("not a url"));
    }

    #[test]
    fn test_crawlable_same_domain_only() {
        assert!(is_crawlable("https://example.com/about", "example.com", EXCLUDED_EXTENSIONS));
        assert!(!is_crawlable("https://other.com/about", "example.com", EXCLUDED_EXTENSIONS));
        assert!(!is_crawlable("https://blog.example.com/", "example.com", EXCLUDED_EXTENSIONS));
    }

    #[test]
    fn test_crawlable_skips_files() {
        assert!(!is_crawlable("https://example.com/brochure.pdf", "example.com", EXCLUDED_EXTENSIONS));
        assert!(!is_crawlable("https://example.com/img/logo.PNG", "example.com", EXCLUDED_EXTENSIONS));
        assert!(!is_crawlable("https://example.com/promo.mp4", "example.com", EXCLUDED_EXTENSIONS));
        assert!(is_crawlable("https://example.com/v1.2/about", "example.com", EXCLUDED_EXTENSIONS));
        assert!(is_crawlable("https://example.com/page.html", "example.com", EXCLUDED_EXTENSIONS));
    }

    #[test]
    fn test_crawlable_skips_special_schemes() {
        for url in [
            "#",
            "#top",
            "mailto:jane@example.com",
            "javascript:void(0)",
            "tel:+14155552671",
            "sms:+14155552671",
            "whatsapp://send?phone=1",
            "ftp://example.com/file",
        ] {
            assert!(!is_crawlable(url, "example.com", EXCLUDED_EXTENSIONS), "{url} should be skipped");
        }
    }

    #[test]
    fn test_resolve_relative_and_strip_fragment() {
        let base = Url::parse("https://example.com/team/").unwrap();
        assert_eq!(resolve(&base, "jane"), Some("https://example.com/team/jane".to_string()));
        assert_eq!(resolve(&base, "/contact#form"), Some("https://example.com/contact".to_string()));
        assert_eq!(resolve(&base, "https://other.com"), Some("https://other.com/".to_string()));
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("https://Example.com/x"), Some("example.com".to_string()));
        assert_eq!(host_of("nope"), None);
    }
}
