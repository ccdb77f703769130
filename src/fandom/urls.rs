//! Canonical wiki URL construction.
//!
//! Pure functions over strings; nothing here validates that a page or thread
//! actually exists.

use url::form_urlencoded;

/// URL to a wiki page, optionally namespaced, with an optional query string.
///
/// Spaces in the page and namespace are replaced with underscores, the form
/// the platform canonicalizes to anyway.
#[must_use]
pub fn page_url(base: &str, page: &str, namespace: Option<&str>, params: &[(&str, &str)]) -> String {
    let page = page.replace(' ', "_");
    let mut url = match namespace {
        Some(ns) => {
            let ns = ns.replace(' ', "_");
            format!("{base}/wiki/{ns}:{page}")
        }
        None => format!("{base}/wiki/{page}"),
    };

    if !params.is_empty() {
        let query: String = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();
        url.push('?');
        url.push_str(&query);
    }

    url
}

/// URL to a discussion thread, or to a specific reply within it.
#[must_use]
pub fn discussions_url(base: &str, thread_id: &str, reply_id: Option<&str>) -> String {
    let mut url = format!("{base}/f/{thread_id}");
    if let Some(reply) = reply_id {
        url.push_str("/r/");
        url.push_str(reply);
    }
    url
}

/// URL to the discussions listing for a tag.
#[must_use]
pub fn tag_url(base: &str, tag: &str) -> String {
    format!("{base}/f/t/{}", tag.replace(' ', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://test.fandom.com";

    #[test]
    fn test_page_url_plain() {
        assert_eq!(
            page_url(BASE, "Main Page", None, &[]),
            "https://test.fandom.com/wiki/Main_Page"
        );
    }

    #[test]
    fn test_page_url_namespaced() {
        assert_eq!(
            page_url(BASE, "Recent changes", Some("Project talk"), &[]),
            "https://test.fandom.com/wiki/Project_talk:Recent_changes"
        );
    }

    #[test]
    fn test_page_url_with_params() {
        let url = page_url(BASE, "Main Page", None, &[("action", "history"), ("limit", "50")]);
        assert_eq!(
            url,
            "https://test.fandom.com/wiki/Main_Page?action=history&limit=50"
        );
    }

    #[test]
    fn test_page_url_contains_no_spaces() {
        let url = page_url(BASE, "A page with spaces", Some("User blog"), &[("q", "a b")]);
        assert!(!url.contains(' '), "got {url}");
    }

    #[test]
    fn test_page_url_idempotent_under_reencoding() {
        // Feeding an already-encoded page component back through the
        // builder must not change it.
        let first = page_url(BASE, "A page with spaces", None, &[]);
        let encoded_page = first.rsplit('/').next().unwrap();
        assert_eq!(encoded_page, "A_page_with_spaces");
        assert_eq!(page_url(BASE, encoded_page, None, &[]), first);

        let namespaced = page_url(BASE, "Recent changes", Some("Project talk"), &[]);
        let (encoded_ns, encoded_page) = namespaced
            .rsplit('/')
            .next()
            .unwrap()
            .split_once(':')
            .unwrap();
        assert_eq!(
            page_url(BASE, encoded_page, Some(encoded_ns), &[]),
            namespaced
        );
    }

    #[test]
    fn test_discussions_url() {
        assert_eq!(
            discussions_url(BASE, "4400000000000012345", None),
            "https://test.fandom.com/f/4400000000000012345"
        );
        assert_eq!(
            discussions_url(BASE, "4400000000000012345", Some("4400000000000099999")),
            "https://test.fandom.com/f/4400000000000012345/r/4400000000000099999"
        );
    }

    #[test]
    fn test_tag_url() {
        assert_eq!(
            tag_url(BASE, "patch notes"),
            "https://test.fandom.com/f/t/patch_notes"
        );
    }
}
