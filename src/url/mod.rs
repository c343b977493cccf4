//! URL handling module for llms-txt-monitor
//!
//! This module provides URL normalization, host extraction, the host scoping
//! rule used by the crawler, and page/asset classification.

mod asset;
mod domain;
mod normalize;

use crate::state::PageType;

// Re-export main functions
pub use asset::is_static_asset;
pub use domain::{extract_host, is_in_scope};
pub use normalize::{normalize_url, parse_strict};

/// Classifies a URL as a crawlable page or a static asset
///
/// Only the URL text is inspected (see [`is_static_asset`]); the response
/// content type plays no part in the decision.
///
/// # Examples
///
/// ```
/// use llms_txt_monitor::url::classify_url;
/// use llms_txt_monitor::PageType;
///
/// assert_eq!(classify_url("https://example.com/about"), PageType::Page);
/// assert_eq!(classify_url("https://example.com/app.js"), PageType::StaticAsset);
/// ```
pub fn classify_url(url: &str) -> PageType {
    if is_static_asset(url) {
        PageType::StaticAsset
    } else {
        PageType::Page
    }
}
