//! URL helper functions for site paths

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

/// Placeholder origin for resolving root-relative hrefs
const SITE_ORIGIN: &str = "http://site.invalid/";

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Encode one path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Path of an article page
///
/// # Examples
/// ```ignore
/// article_path("hello-world") // -> "/articles/hello-world"
/// ```
pub fn article_path(slug: &str) -> String {
    format!("/articles/{}", encode_segment(slug))
}

/// Path of a category listing
pub fn category_path(slug: &str) -> String {
    format!("/categories/{}", encode_segment(slug))
}

/// Link to page `page` of a paginated listing; page 1 has no query string
///
/// # Examples
/// ```ignore
/// page_link("/", 2) // -> "/?page=2"
/// ```
pub fn page_link(base: &str, page: usize) -> String {
    if page <= 1 {
        base.to_string()
    } else {
        format!("{}?page={}", base, page)
    }
}

/// Whether a root-relative href stays on this site once a browser resolves it.
///
/// Browsers read `\` as `/` and skip tabs and newlines, so `/\host` and
/// `/\t/host` leave the site just like `//host` does.
pub fn is_site_path(href: &str) -> bool {
    if !href.starts_with('/') || has_unsafe_chars(href) {
        return false;
    }
    let Ok(base) = Url::parse(SITE_ORIGIN) else {
        return false;
    };
    match base.join(href) {
        Ok(resolved) => resolved.host_str() == base.host_str(),
        Err(_) => false,
    }
}

/// Backslashes and control characters, which browsers rewrite before resolving
pub fn has_unsafe_chars(href: &str) -> bool {
    href.chars().any(|c| c == '\\' || c.is_ascii_control())
}

/// Whether a href leaves the site
pub fn is_external(href: &str) -> bool {
    !is_site_path(href)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(article_path("hello-world"), "/articles/hello-world");
        assert_eq!(category_path("a b/c"), "/categories/a%20b%2Fc");
    }

    #[test]
    fn test_page_link() {
        assert_eq!(page_link("/", 1), "/");
        assert_eq!(page_link("/", 0), "/");
        assert_eq!(page_link("/categories/tech", 3), "/categories/tech?page=3");
    }

    #[test]
    fn test_is_external() {
        assert!(!is_external("/about"));
        assert!(is_external("//evil.example"));
        assert!(is_external("https://example.com"));
        assert!(is_external("mailto:a@b.c"));
        assert!(is_external("/\\evil.example"));
        assert!(is_external("/\t/evil.example"));
    }

    #[test]
    fn test_is_site_path() {
        assert!(is_site_path("/articles/hello"));
        assert!(is_site_path("/?page=2#top"));
        assert!(!is_site_path("//evil.example/x"));
        assert!(!is_site_path("/\\evil.example/x"));
        assert!(!is_site_path("/\n/evil.example"));
        assert!(!is_site_path("about"));
    }
}
