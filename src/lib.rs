pub mod api;
pub mod config;
pub mod content;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod scrape;

use std::sync::Arc;
use config::Config;
use fetch::Fetcher;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub fetcher: Fetcher,
}

impl AppState {
    pub fn new(config: Config) -> error::Result<Self> {
        Ok(Self {
            config: Arc::new(config),
            fetcher: Fetcher::new()?,
        })
    }
}
