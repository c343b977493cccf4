use url::Url;

/// Extracts the host from a URL string
///
/// Returns `None` when the string does not parse or has no host component
/// (`mailto:`, `javascript:`, `data:` and similar).
///
/// The host comes back in the parser's form (ASCII lowercase, IDNA
/// encoded) even though canonical URLs keep the original text. The crawl
/// scope check runs both sides through this function, so `Example.COM`
/// and `example.com` are the same host there.
///
/// # Examples
///
/// ```
/// use llms_txt_monitor::url::extract_host;
///
/// assert_eq!(extract_host("https://blog.example.com/post"), Some("blog.example.com".to_string()));
/// assert_eq!(extract_host("https://example.com:8080/"), Some("example.com".to_string()));
/// assert_eq!(extract_host("https://Docs.Example.COM/P"), Some("docs.example.com".to_string()));
/// assert_eq!(extract_host("mailto:someone@example.com"), None);
/// ```
pub fn extract_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .map(str::to_string)
}

/// Checks whether a host belongs to the crawl scope of `base_host`
///
/// The rule is a plain suffix match: `www.example.com` and
/// `docs.example.com` are in scope for `example.com`. So is
/// `evilexample.com`: no label boundary is enforced.
///
/// # Examples
///
/// ```
/// use llms_txt_monitor::url::is_in_scope;
///
/// assert!(is_in_scope("example.com", "example.com"));
/// assert!(is_in_scope("www.example.com", "example.com"));
/// assert!(!is_in_scope("evil.com", "example.com"));
/// ```
pub fn is_in_scope(host: &str, base_host: &str) -> bool {
    host.ends_with(base_host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_host() {
        assert_eq!(
            extract_host("https://example.com/"),
            Some("example.com".to_string())
        );
    }

    #[test]
    fn test_extract_nested_subdomain() {
        assert_eq!(
            extract_host("https://api.v2.example.com/endpoint"),
            Some("api.v2.example.com".to_string())
        );
    }

    #[test]
    fn test_extract_ip_host() {
        assert_eq!(
            extract_host("http://127.0.0.1:4000/page"),
            Some("127.0.0.1".to_string())
        );
    }

    #[test]
    fn test_extract_hostless() {
        assert_eq!(extract_host("javascript:void(0)"), None);
        assert_eq!(extract_host("data:text/plain,hello"), None);
        assert_eq!(extract_host("not a url"), None);
    }

    #[test]
    fn test_scope_same_host() {
        assert!(is_in_scope("example.com", "example.com"));
    }

    #[test]
    fn test_scope_subdomains() {
        assert!(is_in_scope("www.example.com", "example.com"));
        assert!(is_in_scope("deep.nested.example.com", "example.com"));
    }

    #[test]
    fn test_scope_other_hosts() {
        assert!(!is_in_scope("evil.com", "example.com"));
        assert!(!is_in_scope("example.org", "example.com"));
        assert!(!is_in_scope("example.com", "www.example.com"));
    }

    #[test]
    fn test_scope_suffix_without_label_boundary() {
        assert!(is_in_scope("evilexample.com", "example.com"));
    }
}
