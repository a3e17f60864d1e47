use url::Url;

/// Computes the dedup key of a page: host followed by path
///
/// Scheme, port, query and fragment are not part of the key, so
/// `http://a.com/x?y=1` and `https://a.com/x` name the same page.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_mirror::url::page_key;
///
/// let url = Url::parse("https://example.com/docs/intro?lang=en#top").unwrap();
/// assert_eq!(page_key(&url), "example.com/docs/intro");
/// ```
pub fn page_key(url: &Url) -> String {
    format!("{}{}", url.host_str().unwrap_or_default(), url.path())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> String {
        page_key(&Url::parse(s).unwrap())
    }

    #[test]
    fn test_root_key() {
        assert_eq!(key("https://example.com"), "example.com/");
        assert_eq!(key("https://example.com/"), "example.com/");
    }

    #[test]
    fn test_scheme_and_query_collapse() {
        assert_eq!(key("http://example.com/a?x=1"), key("https://example.com/a"));
        assert_eq!(key("https://example.com/a#frag"), key("https://example.com/a"));
    }

    #[test]
    fn test_port_is_ignored() {
        assert_eq!(key("http://127.0.0.1:8080/page"), "127.0.0.1/page");
    }

    #[test]
    fn test_trailing_slash_is_significant() {
        assert_ne!(key("https://example.com/dir/"), key("https://example.com/dir"));
    }
}
