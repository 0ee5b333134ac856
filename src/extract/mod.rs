pub mod code;

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::content::ScrapedContent;

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("title").expect("Failed to parse title selector")
});

static META_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta").expect("Failed to parse meta selector")
});

static PARAGRAPH_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("p").expect("Failed to parse paragraph selector")
});

static HEADING_SELECTORS: Lazy<Vec<(String, Selector)>> = Lazy::new(|| {
    (1..=6)
        .map(|level| {
            let tag = format!("h{}", level);
            let selector = Selector::parse(&tag).expect("Failed to parse heading selector");
            (tag, selector)
        })
        .collect()
});

/// Collapses every whitespace run to a single space and trims the ends.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses `html` and pulls out title, description, headings, paragraphs and
/// code blocks. Never fails; missing elements just produce empty results.
pub fn extract(html: &str, source_url: &str, status_code: u16) -> ScrapedContent {
    let document = Html::parse_document(html);

    let content = ScrapedContent {
        url: source_url.to_string(),
        title: extract_title(&document),
        meta_description: extract_meta_description(&document),
        headers: extract_headings(&document),
        paragraphs: extract_paragraphs(&document),
        code_blocks: code::collect_code_blocks(&document),
        status_code,
    };

    tracing::debug!(
        url = source_url,
        headings = content.headers.values().map(Vec::len).sum::<usize>(),
        paragraphs = content.paragraphs.len(),
        code_blocks = content.code_blocks.len(),
        "extracted page content"
    );

    content
}

// Presence follows the element, so an empty <title> gives Some("").
fn extract_title(document: &Html) -> Option<String> {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|title| normalize_text(&element_text(title)))
}

fn extract_meta_description(document: &Html) -> Option<String> {
    document
        .select(&META_SELECTOR)
        .find(|meta| meta.value().attr("name") == Some("description"))
        .and_then(|meta| meta.value().attr("content"))
        .map(str::to_string)
}

fn extract_headings(document: &Html) -> BTreeMap<String, Vec<String>> {
    HEADING_SELECTORS
        .iter()
        .filter_map(|(tag, selector)| {
            let texts = normalized_texts(document, selector);
            (!texts.is_empty()).then(|| (tag.clone(), texts))
        })
        .collect()
}

fn extract_paragraphs(document: &Html) -> Vec<String> {
    normalized_texts(document, &PARAGRAPH_SELECTOR)
}

fn normalized_texts(document: &Html, selector: &Selector) -> Vec<String> {
    document
        .select(selector)
        .map(|element| normalize_text(&element_text(element)))
        .filter(|text| !text.is_empty())
        .collect()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/";

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Hello \n\t  world  "), "Hello world");
        assert_eq!(normalize_text(" \n "), "");
        assert_eq!(normalize_text("a\u{a0}b"), "a b");
    }

    #[test]
    fn test_title_is_normalized() {
        let content = extract("<html><head><title>\n  My   Page \n</title></head></html>", URL, 200);
        assert_eq!(content.title.as_deref(), Some("My Page"));
    }

    #[test]
    fn test_missing_title_is_absent() {
        let content = extract("<html><body><p>No title here</p></body></html>", URL, 200);
        assert_eq!(content.title, None);
    }

    #[test]
    fn test_empty_title_is_kept() {
        let content = extract("<html><head><title>   </title></head></html>", URL, 200);
        assert_eq!(content.title.as_deref(), Some(""));
    }

    #[test]
    fn test_meta_description_is_verbatim() {
        let html = r#"<html><head>
            <meta name="keywords" content="a, b">
            <meta name="description" content="  A   page about things ">
            <meta name="description" content="second">
        </head></html>"#;
        let content = extract(html, URL, 200);
        assert_eq!(content.meta_description.as_deref(), Some("  A   page about things "));
    }

    #[test]
    fn test_meta_description_without_content_is_absent() {
        let content = extract(r#"<meta name="description">"#, URL, 200);
        assert_eq!(content.meta_description, None);

        let content = extract(r#"<meta property="og:description" content="x">"#, URL, 200);
        assert_eq!(content.meta_description, None);
    }

    #[test]
    fn test_headings_grouped_by_level() {
        let html = r#"<body>
            <h1>Main</h1>
            <h2>First   section</h2>
            <h3>   </h3>
            <h2>Second
                section</h2>
            <h6><span>Deep</span> <em>note</em></h6>
        </body>"#;
        let content = extract(html, URL, 200);

        assert_eq!(content.headers["h1"], vec!["Main"]);
        assert_eq!(content.headers["h2"], vec!["First section", "Second section"]);
        assert_eq!(content.headers["h6"], vec!["Deep note"]);
        assert!(!content.headers.contains_key("h3"));
        assert!(!content.headers.contains_key("h4"));
        assert!(content.headers.values().all(|texts| !texts.is_empty()));
    }

    #[test]
    fn test_paragraphs_skip_whitespace_only() {
        let html = "<p>One</p><p> \n\t </p><p>Two <b>bold</b>\n words</p><p></p>";
        let content = extract(html, URL, 200);
        assert_eq!(content.paragraphs, vec!["One", "Two bold words"]);
    }

    #[test]
    fn test_malformed_html_is_tolerated() {
        let html = "<html><head><title>Broken<body><h1>Unclosed<p>text <div><pre><code>x";
        let content = extract(html, URL, 200);
        assert_eq!(content.url, URL);
        assert_eq!(content.status_code, 200);
        assert!(content.title.is_some());
    }

    #[test]
    fn test_empty_document() {
        let content = extract("", URL, 204);
        assert_eq!(content.title, None);
        assert!(content.headers.is_empty());
        assert!(content.paragraphs.is_empty());
        assert!(content.code_blocks.is_empty());
        assert_eq!(content.meta_description, None);
        assert_eq!(content.status_code, 204);
    }

    #[test]
    fn test_full_page() {
        let html = r#"<!DOCTYPE html>
            <html>
            <head>
                <title>Docs</title>
                <meta name="description" content="Reference docs">
            </head>
            <body>
                <h1>Install</h1>
                <p>Run the installer.</p>
                <pre class="language-python"><code>print(1)</code></pre>
                <p>Then call <code>main()</code>.</p>
            </body>
            </html>"#;
        let content = extract(html, URL, 200);

        assert_eq!(content.title.as_deref(), Some("Docs"));
        assert_eq!(content.meta_description.as_deref(), Some("Reference docs"));
        assert_eq!(content.headers.len(), 1);
        assert_eq!(content.paragraphs, vec!["Run the installer.", "Then call main()."]);
        assert_eq!(content.code_blocks.len(), 2);
        assert_eq!(content.code_blocks[0].language.as_deref(), Some("python"));
        assert_eq!(content.code_blocks[0].tag, "pre");
        assert_eq!(content.code_blocks[1].content, "main()");
        assert_eq!(content.code_blocks[1].tag, "code");
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let html = r#"<title>T</title><h2>a</h2><p>b</p><pre><code class="json">{}</code></pre>"#;
        let first = serde_json::to_string(&extract(html, URL, 200)).unwrap();
        let second = serde_json::to_string(&extract(html, URL, 200)).unwrap();
        assert_eq!(first, second);
    }
}
