use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// JSON body of `POST /scrape`.
#[derive(Debug, Deserialize)]
pub struct ScrapeRequestBody {
    pub url: String,
    #[serde(default)]
    pub timeout: Option<i64>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Query string of `GET /scrape`.
#[derive(Debug, Deserialize)]
pub struct ScrapeQuery {
    pub url: String,
    #[serde(default)]
    pub timeout: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub endpoints: BTreeMap<String, String>,
}

impl ServiceInfo {
    pub fn describe() -> Self {
        let endpoints = [
            ("GET /", "Describe the available endpoints"),
            ("POST /scrape", "Scrape a website (JSON body: url, timeout, user_agent)"),
            ("GET /scrape", "Scrape a website (query: url, timeout)"),
        ]
        .into_iter()
        .map(|(route, about)| (route.to_string(), about.to_string()))
        .collect();

        Self {
            message: "Website Scraper API".to_string(),
            endpoints,
        }
    }
}
