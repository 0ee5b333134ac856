use std::time::Duration;

use encoding_rs::{Encoding, UTF_8};
use reqwest::{header, Client, ClientBuilder};
use url::Url;

use crate::error::{AppError, FetchError, Result};

/// How far into the body to look for a `<meta>` charset declaration.
const CHARSET_SNIFF_LIMIT: usize = 1024;

/// Raw result of a successful fetch.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status_code: u16,
    pub body: Vec<u8>,
    /// Charset from the `Content-Type` header, if the server sent one.
    pub charset: Option<String>,
}

impl FetchedPage {
    pub fn text(&self) -> String {
        decode_body(&self.body, self.charset.as_deref())
    }
}

/// Issues the outbound GET requests. Cloning shares the connection pool.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        let client = ClientBuilder::new()
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Fetches `url` once. `timeout` covers connecting, the response and
    /// reading the body; 4xx and 5xx statuses count as failures.
    pub async fn fetch(
        &self,
        url: &Url,
        timeout: Duration,
        user_agent: &str,
    ) -> std::result::Result<FetchedPage, FetchError> {
        let started = std::time::Instant::now();
        tracing::debug!(%url, timeout_secs = timeout.as_secs(), "fetching page");

        let map_err = |err: reqwest::Error| {
            if err.is_timeout() {
                FetchError::Timeout(timeout.as_secs())
            } else {
                FetchError::RequestFailed(err.to_string())
            }
        };

        let response = self
            .client
            .get(url.clone())
            .header(header::USER_AGENT, user_agent)
            .timeout(timeout)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(map_err)?;

        let status_code = response.status().as_u16();
        let charset = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(charset_from_content_type);

        let body = response.bytes().await.map_err(map_err)?.to_vec();

        tracing::info!(
            %url,
            status_code,
            bytes = body.len(),
            elapsed = ?started.elapsed(),
            "fetched page"
        );

        Ok(FetchedPage { status_code, body, charset })
    }
}

fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Reads the charset declared by a `<meta charset>` tag, or by the `content`
/// of a `<meta http-equiv="content-type">` tag, near the top of the document.
fn sniff_meta_charset(body: &[u8]) -> Option<String> {
    let head = &body[..body.len().min(CHARSET_SNIFF_LIMIT)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    head.match_indices("<meta").find_map(|(start, _)| {
        let tag = &head[start + "<meta".len()..];
        if !tag.starts_with(|c: char| c.is_ascii_whitespace() || c == '/') {
            return None;
        }
        let attrs = tag_attributes(&tag[..tag.find('>').unwrap_or(tag.len())]);
        let attr = |name: &str| attrs.iter().find(|(key, _)| *key == name).map(|(_, value)| *value);

        let charset = match attr("charset") {
            Some(charset) => Some(charset.trim().to_string()),
            None if attr("http-equiv").map(str::trim) == Some("content-type") => {
                attr("content").and_then(charset_from_content_type)
            }
            None => None,
        };
        charset.filter(|charset| !charset.is_empty())
    })
}

/// Splits the inside of a start tag into `(name, value)` pairs. Values may be
/// double-quoted, single-quoted or bare; a name without `=` gets `""`.
fn tag_attributes(tag: &str) -> Vec<(&str, &str)> {
    let mut attrs = Vec::new();
    let mut rest = tag;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '/');
        if rest.is_empty() {
            break;
        }

        let name_end = rest
            .find(|c: char| c.is_ascii_whitespace() || c == '=' || c == '/')
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        rest = rest[name_end..].trim_start();

        let mut value = "";
        if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            match after_eq.chars().next().filter(|c| *c == '"' || *c == '\'') {
                Some(quote) => {
                    let inner = &after_eq[1..];
                    let end = inner.find(quote).unwrap_or(inner.len());
                    value = &inner[..end];
                    rest = inner.get(end + 1..).unwrap_or("");
                }
                None => {
                    let end = after_eq
                        .find(|c: char| c.is_ascii_whitespace())
                        .unwrap_or(after_eq.len());
                    value = &after_eq[..end];
                    rest = &after_eq[end..];
                }
            }
        }

        if !name.is_empty() {
            attrs.push((name, value));
        }
    }

    attrs
}

/// Decodes a page body using the header charset, then any `<meta>` charset,
/// then UTF-8. A byte order mark overrides all of them. Invalid sequences are
/// replaced rather than rejected.
pub fn decode_body(body: &[u8], header_charset: Option<&str>) -> String {
    let encoding = header_charset
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| {
            sniff_meta_charset(body).and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or(UTF_8);

    let (text, _, _) = encoding.decode(body);
    text.into_owned()
}
