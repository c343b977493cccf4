//! Client-side rendering support
//!
//! Pages built by a JavaScript framework often ship an almost empty HTML
//! shell. For those pages the crawler asks a headless browser for the
//! hydrated DOM and keeps it when it carries noticeably more content.
//!
//! - `is_likely_csr` / `is_richer`: the two heuristics
//! - `CsrRenderer`: the headless browser collaborator
//! - `BrowserlessRenderer`: renders through a Browserless `/content` endpoint
//! - `NoopRenderer`: rendering disabled
//! - `hydrate`: ties the pieces together for one page

use super::parser::visible_text;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Markers that frameworks leave in the shell of a client-rendered page
const CSR_MARKERS: &[&str] = &["id=\"root\"", "id='root'", "<app-root", "</app-root>"];

/// Default timeout for one render, covering page load and network idle
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Returns true when the HTML looks like a client-rendered shell
///
/// A page qualifies when it is shorter than `threshold_bytes` or when its
/// lowercased markup contains a framework mount point (`id="root"`,
/// `id='root'`, `<app-root`, `</app-root>`).
///
/// # Example
///
/// ```
/// use llms_txt_monitor::crawler::is_likely_csr;
///
/// assert!(is_likely_csr("<html><div id=\"root\"></div></html>", 3072));
/// ```
pub fn is_likely_csr(html: &str, threshold_bytes: usize) -> bool {
    if html.len() < threshold_bytes {
        return true;
    }

    let lower = html.to_lowercase();
    CSR_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Returns true when the rendered DOM carries more than 20% extra content
///
/// Either the markup or the visible text has to grow by more than 1.2x.
pub fn is_richer(rendered_html: &str, ssr_html: &str) -> bool {
    if exceeds_by_a_fifth(rendered_html.len(), ssr_html.len()) {
        return true;
    }

    let rendered_text = visible_text(rendered_html).chars().count();
    let ssr_text = visible_text(ssr_html).chars().count();
    exceeds_by_a_fifth(rendered_text, ssr_text)
}

/// `candidate > 1.2 * baseline`, in integers
fn exceeds_by_a_fifth(candidate: usize, baseline: usize) -> bool {
    candidate.saturating_mul(5) > baseline.saturating_mul(6)
}

/// Headless browser collaborator
///
/// Implementations must release every browser resource they acquire before
/// returning, on success and on failure, and must never fail loudly: any
/// problem is reported as `None`.
#[async_trait]
pub trait CsrRenderer: Send + Sync {
    /// Loads `url`, waits for network idle and returns the serialized DOM
    async fn render_client_side(&self, url: &str) -> Option<String>;
}

/// Renderer used when no headless browser is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRenderer;

#[async_trait]
impl CsrRenderer for NoopRenderer {
    async fn render_client_side(&self, _url: &str) -> Option<String> {
        None
    }
}

/// Errors returned by the Browserless endpoint
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<reqwest::Error> for RenderError {
    fn from(err: reqwest::Error) -> Self {
        RenderError::Network(err.to_string())
    }
}

/// Renders pages through a Browserless `/content` endpoint
///
/// Each call is one self-contained browser session on the Browserless side;
/// the session ends when the request completes or is dropped.
pub struct BrowserlessRenderer {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessRenderer {
    /// Creates a renderer for the Browserless instance at `base_url`
    ///
    /// # Arguments
    ///
    /// * `base_url` - Root URL of the Browserless instance
    /// * `token` - Optional API token, sent as the `token` query parameter
    /// * `timeout` - Upper bound for one render
    pub fn new(
        base_url: &str,
        token: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        })
    }

    /// Fetches the hydrated HTML of `url`
    pub async fn content(&self, url: &str) -> Result<String, RenderError> {
        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }

        let body = serde_json::json!({
            "url": url,
            "gotoOptions": { "waitUntil": "networkidle0" },
        });

        let resp = self.client.post(&endpoint).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(RenderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }
}

#[async_trait]
impl CsrRenderer for BrowserlessRenderer {
    async fn render_client_side(&self, url: &str) -> Option<String> {
        match self.content(url).await {
            Ok(html) => Some(html),
            Err(e) => {
                tracing::debug!("Client-side render failed for {}: {}", url, e);
                None
            }
        }
    }
}

/// Returns the HTML the crawler should extract from
///
/// Pages that look client-rendered are sent to the renderer; the rendered
/// DOM replaces the fetched HTML only when [`is_richer`] says so. In every
/// other case the fetched HTML is returned unchanged.
pub async fn hydrate(
    renderer: &dyn CsrRenderer,
    url: &str,
    ssr_html: String,
    threshold_bytes: usize,
) -> String {
    if !is_likely_csr(&ssr_html, threshold_bytes) {
        return ssr_html;
    }

    tracing::debug!("Page looks client-rendered, rendering: {}", url);

    match renderer.render_client_side(url).await {
        Some(rendered) if is_richer(&rendered, &ssr_html) => {
            tracing::debug!("Using client-side rendered DOM for: {}", url);
            rendered
        }
        Some(_) => {
            tracing::debug!("Rendered DOM not richer, keeping fetched HTML for: {}", url);
            ssr_html
        }
        None => ssr_html,
    }
}
