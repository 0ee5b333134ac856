use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub language: Option<String>,
    pub content: String,
    /// Name of the element the block was taken from, e.g. `pre` or `code`.
    pub tag: String,
}

/// Everything pulled out of one fetched page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedContent {
    pub url: String,
    pub title: Option<String>,
    /// Heading texts keyed by level name (`h1`..`h6`). Levels without any
    /// non-empty heading are left out.
    pub headers: BTreeMap<String, Vec<String>>,
    pub paragraphs: Vec<String>,
    pub code_blocks: Vec<CodeBlock>,
    pub meta_description: Option<String>,
    pub status_code: u16,
}
