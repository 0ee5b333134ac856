use std::time::Duration;

use url::Url;

use crate::content::ScrapedContent;
use crate::error::{AppError, Result};
use crate::extract::extract;
use crate::fetch::Fetcher;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// A validated scrape call: absolute http(s) URL and a positive timeout.
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    url: Url,
    timeout_secs: u64,
    user_agent: String,
}

impl ScrapeRequest {
    pub fn new(url: &str, timeout_secs: i64, user_agent: impl Into<String>) -> Result<Self> {
        let url = Url::parse(url.trim())
            .map_err(|e| AppError::InvalidRequest(format!("invalid URL '{}': {}", url, e)))?;
        if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
            return Err(AppError::InvalidRequest(format!(
                "URL must be an absolute http or https URL, got '{}'",
                url
            )));
        }

        let timeout_secs = u64::try_from(timeout_secs)
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| {
                AppError::InvalidRequest(format!(
                    "timeout must be a positive number of seconds, got {}",
                    timeout_secs
                ))
            })?;

        Ok(Self {
            url,
            timeout_secs,
            user_agent: user_agent.into(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

/// Fetches the requested page and extracts its content.
///
/// Fetch failures come back as [`AppError::FetchError`]; anything that goes
/// wrong after the page arrived is [`AppError::Unexpected`].
pub async fn scrape(fetcher: &Fetcher, req: &ScrapeRequest) -> Result<ScrapedContent> {
    let page = fetcher
        .fetch(req.url(), req.timeout(), req.user_agent())
        .await?;

    let source_url = req.url().to_string();
    let content = tokio::task::spawn_blocking(move || {
        let html = page.text();
        extract(&html, &source_url, page.status_code)
    })
    .await?;

    Ok(content)
}
