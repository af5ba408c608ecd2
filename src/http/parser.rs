//! HTTP Message Parser
//!
//! Pure text functions over raw messages: no I/O happens here.

use crate::error::{ProxyError, Result};

const HOST_HEADER: &str = "Host:";
const DATE_HEADER: &str = "Date:";

/// Routing and caching view of one client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Request method as sent by the client
    pub method: String,
    /// Value of the Host header
    pub host: String,
    /// Request target with any `http://` or `https://` prefix removed
    pub url: String,
    /// Canonical request line the response is cached under
    pub cache_key: String,
}

impl RequestDescriptor {
    /// Derives host, URL and cache key from a raw request.
    ///
    /// Fails if the request has no Host header or no
    /// `<METHOD> <target> HTTP/1.x` request line.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let text = String::from_utf8_lossy(raw);

        let host = extract_host(&text);
        if host.is_empty() {
            return Err(ProxyError::Parse("missing Host header".to_string()));
        }

        let (method, _) = request_line(&text)
            .ok_or_else(|| ProxyError::Parse("malformed request line".to_string()))?;
        let url = extract_url(&text)
            .ok_or_else(|| ProxyError::Parse("malformed request line".to_string()))?;

        // Origin-form targets ("/path") only make sense relative to the host
        let absolute = if url.starts_with('/') {
            format!("{}{}", host, url)
        } else {
            url.clone()
        };
        let cache_key = build_cache_key(&format!("http://{}", absolute));

        Ok(Self {
            method: method.to_string(),
            host,
            url,
            cache_key,
        })
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }
}

/// Returns the value of the first `Host:` header with every space, CR and LF
/// removed, or an empty string if there is none.
pub fn extract_host(msg: &str) -> String {
    msg.lines()
        .find_map(|line| line.strip_prefix(HOST_HEADER))
        .map(|value| {
            value
                .chars()
                .filter(|c| !matches!(c, ' ' | '\r' | '\n'))
                .collect()
        })
        .unwrap_or_default()
}

/// Returns the request target from the request line, without an `http://`
/// or `https://` prefix.
///
/// Only a scheme at the very start of the target is removed; `http`
/// appearing elsewhere in the URL is left alone.
pub fn extract_url(msg: &str) -> Option<String> {
    let (_, target) = request_line(msg)?;
    let url = target
        .strip_prefix("http://")
        .or_else(|| target.strip_prefix("https://"))
        .unwrap_or(target);
    Some(url.to_string())
}

/// Builds the canonical `GET <url> HTTP/1.0\r\n` line used as a cache key.
///
/// Nothing but the URL goes in, so requests that differ only in their other
/// headers share a key.
pub fn build_cache_key(url: &str) -> String {
    format!("GET {} HTTP/1.0\r\n", url)
}

/// Returns the three-character status code of an HTTP/1.x response with
/// spaces, CR and LF removed, or an empty string if no status line is found.
pub fn strip_response_code(msg: &str) -> String {
    ["HTTP/1.0 ", "HTTP/1.1 "]
        .iter()
        .find_map(|prefix| msg.find(prefix).map(|at| &msg[at + prefix.len()..]))
        .map(|rest| {
            rest.chars()
                .take(3)
                .filter(|c| !matches!(c, ' ' | '\r' | '\n'))
                .collect()
        })
        .unwrap_or_default()
}

/// Builds a conditional request asking whether `response` is still current.
///
/// Appends `If-Modified-Since: <Date of response>` to `request` and closes
/// the header block. Returns None when the response carries no Date header.
pub fn build_revalidation_request(request: &str, response: &str) -> Option<String> {
    let date = response
        .lines()
        .find_map(|line| line.strip_prefix(DATE_HEADER))
        .map(str::trim)
        .filter(|date| !date.is_empty())?;

    let head = request.trim_end_matches(['\r', '\n']);
    Some(format!("{}\r\nIf-Modified-Since: {}\r\n\r\n", head, date))
}

/// Splits the first line into method and target, requiring an HTTP/1.x
/// version token.
fn request_line(msg: &str) -> Option<(&str, &str)> {
    let line = msg.lines().next()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;
    let version = parts.next()?;
    if !version.starts_with("HTTP/1.") || parts.next().is_some() {
        return None;
    }
    Some((method, target))
}
