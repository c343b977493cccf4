//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the fixed crawler user agent
//! - GET requests for HTML pages (text content types only)
//! - GET requests for script assets (any content type, raw bytes)
//! - Error classification into a `FetchResult`
//!
//! Fetch failures are values, not errors: the crawl loop inspects the
//! result, logs it and skips the URL.

use reqwest::Client;
use std::time::Duration;

/// User-Agent sent with every crawler request
pub const USER_AGENT: &str = "llms-txt-crawler";

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult<B> {
    /// Successfully fetched the resource
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value (empty if absent)
        content_type: String,
        /// Response body
        body: B,
    },

    /// Resource is not a document the caller accepts
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Server answered with a non-2xx status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, DNS, body decode)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl<B> FetchResult<B> {
    /// Short description of a failed fetch, for logs
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::ContentMismatch { content_type } => {
                Some(format!("unsupported content type '{}'", content_type))
            }
            Self::HttpError { status_code } => Some(format!("HTTP {}", status_code)),
            Self::NetworkError { error } => Some(error.clone()),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `timeout` - Per-request timeout covering connect and read
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use llms_txt_monitor::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(Duration::from_millis(8000)).unwrap();
/// ```
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches an HTML page
///
/// Accepts `text/*` responses and XML documents (`application/xml`,
/// `application/xhtml+xml`, ...). A response without a Content-Type header
/// is treated as text.
pub async fn fetch_html(client: &Client, url: &str) -> FetchResult<String> {
    let response = match send(client, url).await {
        Ok(response) => response,
        Err(result) => return result,
    };

    let status_code = response.status().as_u16();
    let final_url = response.url().to_string();
    let content_type = content_type_of(&response);

    if !is_text_content_type(&content_type) {
        return FetchResult::ContentMismatch { content_type };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code,
            content_type,
            body,
        },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}

/// Fetches the raw bytes of an asset, whatever its content type
pub async fn fetch_asset(client: &Client, url: &str) -> FetchResult<Vec<u8>> {
    let response = match send(client, url).await {
        Ok(response) => response,
        Err(result) => return result,
    };

    let status_code = response.status().as_u16();
    let final_url = response.url().to_string();
    let content_type = content_type_of(&response);

    match response.bytes().await {
        Ok(bytes) => FetchResult::Success {
            final_url,
            status_code,
            content_type,
            body: bytes.to_vec(),
        },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}

/// Sends the GET request and classifies transport and status failures
async fn send<B>(client: &Client, url: &str) -> Result<reqwest::Response, FetchResult<B>> {
    let response = client.get(url).send().await.map_err(|e| {
        let error = if e.is_timeout() {
            "Request timeout".to_string()
        } else if e.is_connect() {
            "Connection refused".to_string()
        } else {
            e.to_string()
        };
        FetchResult::NetworkError { error }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchResult::HttpError {
            status_code: status.as_u16(),
        });
    }

    Ok(response)
}

fn content_type_of(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

/// Returns true for content types an HTML fetch accepts
fn is_text_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    mime.is_empty()
        || mime.starts_with("text/")
        || mime == "application/xml"
        || mime.ends_with("+xml")
}
