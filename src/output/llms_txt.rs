//! `llms.txt` generation
//!
//! The file is a short header followed by one block per page:
//!
//! ```text
//! # llms.txt generated for https://example.com/
//! # Generated at 2024-05-01T12:00:00.123
//!
//! URL: https://example.com/
//! TITLE: Home
//! DESCRIPTION: Welcome
//!
//! ```
//!
//! `TITLE:` and `DESCRIPTION:` lines are left out when the value is missing
//! (static assets, pages without a meta description). An empty title still
//! produces a `TITLE: ` line.

use crate::output::traits::{OutputResult, TextGenerator};
use crate::storage::PageRecord;
use chrono::{Local, NaiveDateTime};
use std::fs;
use std::path::Path;

/// Timestamp layout of the header, local time without offset
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Generator that stamps the header with the current local time
#[derive(Debug, Default, Clone, Copy)]
pub struct LlmsTxtGenerator;

impl TextGenerator for LlmsTxtGenerator {
    fn generate(&self, base_url: &str, pages: Option<&[PageRecord]>) -> String {
        match pages {
            Some(pages) => format_llms_txt(base_url, pages, Local::now().naive_local()),
            None => String::new(),
        }
    }
}

/// Formats the `llms.txt` text for a fixed generation time
///
/// # Arguments
///
/// * `base_url` - The site the pages belong to
/// * `pages` - Page records, in the order they should be listed
/// * `generated_at` - Local time written into the header
///
/// # Returns
///
/// The complete file contents
pub fn format_llms_txt(base_url: &str, pages: &[PageRecord], generated_at: NaiveDateTime) -> String {
    let mut text = String::new();

    text.push_str(&format!("# llms.txt generated for {}\n", base_url));
    text.push_str(&format!(
        "# Generated at {}\n\n",
        generated_at.format(TIMESTAMP_FORMAT)
    ));

    for page in pages {
        text.push_str(&format!("URL: {}\n", page.url));
        if let Some(title) = &page.title {
            text.push_str(&format!("TITLE: {}\n", title));
        }
        if let Some(description) = &page.description {
            text.push_str(&format!("DESCRIPTION: {}\n", description));
        }
        text.push('\n');
    }

    tracing::debug!(
        "Generated llms.txt for {}: {} pages, {} bytes",
        base_url,
        pages.len(),
        text.len()
    );

    text
}

/// Writes generated text to `output_path`
pub fn write_llms_txt(text: &str, output_path: &Path) -> OutputResult<()> {
    fs::write(output_path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PageType;
    use chrono::NaiveDate;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_milli_opt(12, 30, 15, 250)
            .unwrap()
    }

    fn record(url: &str, title: Option<&str>, description: Option<&str>) -> PageRecord {
        PageRecord {
            snapshot_id: 1,
            url: url.to_string(),
            title: title.map(String::from),
            description: description.map(String::from),
            content_hash: "h".to_string(),
            page_type: if title.is_some() {
                PageType::Page
            } else {
                PageType::StaticAsset
            },
        }
    }

    #[test]
    fn test_empty_page_list_is_header_only() {
        let text = format_llms_txt("https://example.com/", &[], generated_at());
        assert_eq!(
            text,
            "# llms.txt generated for https://example.com/\n# Generated at 2024-05-01T12:30:15.250\n\n"
        );
    }

    #[test]
    fn test_page_blocks() {
        let pages = vec![
            record("https://example.com/", Some("Home"), Some("Welcome")),
            record("https://example.com/a", Some(""), None),
            record("https://example.com/app.js", None, None),
        ];

        let text = format_llms_txt("https://example.com/", &pages, generated_at());
        let body = text.split_once("\n\n").unwrap().1;

        assert_eq!(
            body,
            "URL: https://example.com/\nTITLE: Home\nDESCRIPTION: Welcome\n\n\
             URL: https://example.com/a\nTITLE: \n\n\
             URL: https://example.com/app.js\n\n"
        );
    }

    #[test]
    fn test_none_pages_yield_empty_string() {
        assert_eq!(LlmsTxtGenerator.generate("https://example.com/", None), "");
    }

    #[test]
    fn test_generator_writes_header() {
        let text = LlmsTxtGenerator.generate("https://example.com/", Some(&[]));
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("# llms.txt generated for https://example.com/")
        );
        assert!(lines.next().unwrap().starts_with("# Generated at "));
        assert_eq!(lines.next(), Some(""));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_write_llms_txt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("llms.txt");

        write_llms_txt("URL: https://example.com/\n", &path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "URL: https://example.com/\n"
        );
    }
}
