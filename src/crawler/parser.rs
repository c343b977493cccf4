//! HTML parser for extracting page metadata, visible text and links
//!
//! This module handles parsing HTML content to extract:
//! - Page title and meta description
//! - Visible body text (the input of the content fingerprint)
//! - Outbound links from `<a href>` tags
//! - External script sources from `<script src>` tags

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Elements whose text never counts as visible
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that separate words when their text is flattened
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Text of the first `<title>`, whitespace-collapsed; empty if none
    pub title: String,

    /// `content` of the first `<meta name="description">`, if the tag exists
    pub description: Option<String>,

    /// Visible body text, whitespace-collapsed
    pub text: String,

    /// Every `<a href>` resolved against the page URL
    pub links: Vec<String>,

    /// Every `<script src>` resolved against the page URL
    pub scripts: Vec<String>,
}

/// Parses HTML content and extracts metadata, text and links
///
/// Links and scripts are only resolved here, not filtered; normalization,
/// host scoping and asset classification are the crawler's job. Hrefs that
/// cannot be resolved against the page URL are skipped.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `page_url` - The URL of the page, for resolving relative links
///
/// # Example
///
/// ```
/// use llms_txt_monitor::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let page_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &page_url);
/// assert_eq!(parsed.title, "Test");
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, page_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        description: extract_description(&document),
        text: extract_body_text(&document),
        links: resolve_attr(&document, "a[href]", "href", page_url),
        scripts: resolve_attr(&document, "script[src]", "src", page_url),
    }
}

/// Returns the visible body text of an HTML document
///
/// Used by the CSR richness check, which compares text lengths without
/// needing the rest of the page.
pub fn visible_text(html: &str) -> String {
    extract_body_text(&Html::parse_document(html))
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn extract_title(document: &Html) -> String {
    selector("title")
        .and_then(|sel| {
            document
                .select(&sel)
                .next()
                .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        })
        .unwrap_or_default()
}

fn extract_description(document: &Html) -> Option<String> {
    let sel = selector("meta[name]")?;

    document
        .select(&sel)
        .find(|element| {
            element
                .value()
                .attr("name")
                .map_or(false, |name| name.eq_ignore_ascii_case("description"))
        })
        .map(|element| element.value().attr("content").unwrap_or("").to_string())
}

fn extract_body_text(document: &Html) -> String {
    let body = selector("body").and_then(|sel| document.select(&sel).next());

    match body {
        Some(body) => {
            let mut raw = String::new();
            collect_text(body, &mut raw);
            collapse_whitespace(&raw)
        }
        None => String::new(),
    }
}

/// Appends the text under `element`, skipping hidden subtrees
fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if HIDDEN_ELEMENTS.contains(&name) {
                continue;
            }

            let is_block = BLOCK_ELEMENTS.contains(&name);
            if is_block {
                out.push(' ');
            }
            collect_text(child_element, out);
            if is_block {
                out.push(' ');
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn resolve_attr(document: &Html, css: &str, attr: &str, page_url: &Url) -> Vec<String> {
    let Some(sel) = selector(css) else {
        return Vec::new();
    };

    document
        .select(&sel)
        .filter_map(|element| element.value().attr(attr))
        .filter_map(|href| page_url.join(href.trim()).ok())
        .map(String::from)
        .collect()
}
