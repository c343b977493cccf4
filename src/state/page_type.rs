use std::fmt;

/// Kind of record a crawl produces for a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageType {
    /// HTML document that takes part in the breadth-first traversal
    Page,

    /// External script referenced by a page; fetched once, never expanded
    StaticAsset,
}

impl PageType {
    /// Converts the page type to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Page => "PAGE",
            Self::StaticAsset => "STATIC_ASSET",
        }
    }

    /// Parses a page type from its database string representation
    ///
    /// Returns None if the string doesn't match any known type.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "PAGE" => Some(Self::Page),
            "STATIC_ASSET" => Some(Self::StaticAsset),
            _ => None,
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// A single record produced by the crawler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    /// Canonical URL
    pub url: String,

    /// Text of the first `<title>` (empty if the page has none); `None` for assets
    pub title: Option<String>,

    /// `content` of `<meta name="description">`; `None` if missing or for assets
    pub description: Option<String>,

    /// SHA-256 of the visible text (pages) or raw bytes (assets), lowercase hex
    pub content_hash: String,

    /// Page or static asset
    pub page_type: PageType,
}

impl PageInfo {
    /// Builds the record for an HTML page
    pub fn page(
        url: impl Into<String>,
        title: impl Into<String>,
        description: Option<String>,
        content_hash: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: Some(title.into()),
            description,
            content_hash: content_hash.into(),
            page_type: PageType::Page,
        }
    }

    /// Builds the record for a static asset
    pub fn asset(url: impl Into<String>, content_hash: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            description: None,
            content_hash: content_hash.into(),
            page_type: PageType::StaticAsset,
        }
    }
}
