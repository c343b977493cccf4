use crate::{UrlError, UrlResult};
use url::Url;

/// Characters that may never appear literally in a URI reference
const ILLEGAL_CHARS: &[char] = &['<', '>', '"', '{', '}', '|', '\\', '^', '`'];

/// Normalizes a raw URL string into its canonical form
///
/// # Normalization Steps
///
/// 1. Reject blank input
/// 2. Reject text that is not a valid URI reference (whitespace, control
///    characters, `<>"{}|\^` or backtick, more than one `#`, broken `%XX`
///    escapes)
/// 3. Parse the URL; reject relative references (no scheme)
/// 4. Cut the text at the first `#`
/// 5. Insert `/` when a URL with an authority has an empty path
///
/// The parsed URL is only used for validation. The canonical form is the
/// raw text itself: host and path keep their case, nothing is percent
/// encoded or decoded, dot segments and default ports stay in place.
/// Normalizing an already normalized URL is a no-op.
///
/// Every rejection is reported as `None`; callers drop such URLs silently.
///
/// # Examples
///
/// ```
/// use llms_txt_monitor::url::normalize_url;
///
/// assert_eq!(
///     normalize_url("http://x/p?q=v#f").as_deref(),
///     Some("http://x/p?q=v")
/// );
/// assert_eq!(
///     normalize_url("https://Example.COM/P").as_deref(),
///     Some("https://Example.COM/P")
/// );
/// assert_eq!(normalize_url("example.com/p"), None);
/// assert_eq!(normalize_url("  "), None);
/// ```
pub fn normalize_url(raw: &str) -> Option<String> {
    match parse_strict(raw) {
        Ok(url) => Some(canonical_text(raw, &url)),
        Err(e) => {
            tracing::trace!("Dropping URL {:?}: {}", raw, e);
            None
        }
    }
}

/// Builds the canonical text of a validated URL from its raw form
fn canonical_text(raw: &str, url: &Url) -> String {
    let text = raw.split_once('#').map_or(raw, |(head, _)| head);

    if !url.has_authority() {
        return text.to_string();
    }

    // The authority runs from "//" to the first '/' or '?'
    let Some(start) = text.find("//").map(|at| at + 2) else {
        return text.to_string();
    };
    let end = text[start..]
        .find(|c: char| c == '/' || c == '?')
        .map_or(text.len(), |at| start + at);

    if text[end..].starts_with('/') {
        text.to_string()
    } else {
        format!("{}/{}", &text[..end], &text[end..])
    }
}

/// Parses a URL with URI syntax checks and strips its fragment
///
/// This is the fallible validation step of [`normalize_url`]. It is public
/// so callers that must report *why* a URL was refused (for example a base
/// URL given on the command line) can surface the error. The returned
/// `Url` is the parser's serialization, not the canonical text.
pub fn parse_strict(raw: &str) -> UrlResult<Url> {
    if raw.trim().is_empty() {
        return Err(UrlError::Blank);
    }

    check_uri_syntax(raw)?;

    let mut url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            return Err(UrlError::MissingScheme(raw.to_string()))
        }
        Err(e) => return Err(UrlError::Parse(e.to_string())),
    };

    url.set_fragment(None);

    Ok(url)
}

/// Checks that the raw text only uses characters a URI may contain
fn check_uri_syntax(raw: &str) -> UrlResult<()> {
    if let Some(c) = raw
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || ILLEGAL_CHARS.contains(c))
    {
        return Err(UrlError::Malformed(format!("illegal character {:?}", c)));
    }

    // A fragment may not itself contain '#'
    if raw.matches('#').count() > 1 {
        return Err(UrlError::Malformed("more than one '#'".to_string()));
    }

    let bytes = raw.as_bytes();
    for (at, _) in raw.match_indices('%') {
        let well_formed = bytes
            .get(at + 1..at + 3)
            .map_or(false, |hex| hex.iter().all(u8::is_ascii_hexdigit));

        if !well_formed {
            return Err(UrlError::Malformed(format!(
                "malformed escape at index {}",
                at
            )));
        }
    }

    Ok(())
}
