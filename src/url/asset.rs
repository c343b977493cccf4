/// File extensions that mark a URL as a static asset
const ASSET_EXTENSIONS: &[&str] = &[".js", ".css", ".map"];

/// Returns true if the URL points at a static asset
///
/// A URL is a static asset iff its lowercased text ends with `.js`, `.css`
/// or `.map`. Nothing else (images, fonts, PDFs) is treated as an asset, so
/// a query string after the extension makes the URL a regular page.
///
/// # Examples
///
/// ```
/// use llms_txt_monitor::url::is_static_asset;
///
/// assert!(is_static_asset("https://example.com/bundle.JS"));
/// assert!(!is_static_asset("https://example.com/bundle.js?v=2"));
/// assert!(!is_static_asset("https://example.com/logo.png"));
/// ```
pub fn is_static_asset(url: &str) -> bool {
    let lower = url.to_lowercase();
    ASSET_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_is_asset() {
        assert!(is_static_asset("https://example.com/main.js"));
    }

    #[test]
    fn test_stylesheet_is_asset() {
        assert!(is_static_asset("https://example.com/css/site.css"));
    }

    #[test]
    fn test_source_map_is_asset() {
        assert!(is_static_asset("https://example.com/main.js.map"));
    }

    #[test]
    fn test_uppercase_extension() {
        assert!(is_static_asset("https://example.com/MAIN.JS"));
        assert!(is_static_asset("https://example.com/Site.Css"));
    }

    #[test]
    fn test_pages_are_not_assets() {
        assert!(!is_static_asset("https://example.com/"));
        assert!(!is_static_asset("https://example.com/about"));
        assert!(!is_static_asset("https://example.com/page.html"));
        assert!(!is_static_asset("https://example.com/image.png"));
    }

    #[test]
    fn test_extension_must_be_suffix() {
        assert!(!is_static_asset("https://example.com/app.js?v=1"));
        assert!(!is_static_asset("https://example.com/javascript"));
        assert!(!is_static_asset("https://example.com/app.json"));
    }
}
