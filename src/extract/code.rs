use std::collections::HashSet;

use scraper::{ElementRef, Html};

use crate::content::CodeBlock;

/// Class names taken as a language when they appear on their own.
pub const KNOWN_LANGUAGES: &[&str] = &[
    "python", "javascript", "html", "css", "java", "cpp", "c", "sql", "json", "xml",
];

const LANGUAGE_PREFIXES: &[&str] = &["language-", "lang-", "highlight-"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassRule {
    Any,
    /// One of the element's classes equals the name.
    Token(&'static str),
    /// The raw `class` attribute contains the text anywhere.
    Contains(&'static str),
}

/// Declarative rule for finding code-bearing elements.
///
/// When `inside` is set the element must have an ancestor with that tag, and
/// the block is attributed to the nearest such ancestor. That keeps a
/// `<pre><code>` pair from being reported twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeMatcher {
    pub tag: Option<&'static str>,
    pub inside: Option<&'static str>,
    pub class: ClassRule,
}

impl CodeMatcher {
    const fn tag(tag: &'static str) -> Self {
        Self { tag: Some(tag), inside: None, class: ClassRule::Any }
    }

    const fn tag_inside(tag: &'static str, inside: &'static str) -> Self {
        Self { tag: Some(tag), inside: Some(inside), class: ClassRule::Any }
    }

    const fn class(class: ClassRule) -> Self {
        Self { tag: None, inside: None, class }
    }

    pub fn matches(&self, element: &ElementRef<'_>) -> bool {
        if let Some(tag) = self.tag {
            if element.value().name() != tag {
                return false;
            }
        }
        if let Some(inside) = self.inside {
            if nearest_ancestor(element, inside).is_none() {
                return false;
            }
        }
        match self.class {
            ClassRule::Any => true,
            ClassRule::Token(name) => class_list(*element).any(|c| c == name),
            ClassRule::Contains(needle) => element
                .value()
                .attr("class")
                .is_some_and(|raw| raw.contains(needle)),
        }
    }

    fn owner<'a>(&self, element: ElementRef<'a>) -> ElementRef<'a> {
        self.inside
            .and_then(|inside| nearest_ancestor(&element, inside))
            .unwrap_or(element)
    }
}

/// Evaluated in order; earlier matchers win an element.
pub const CODE_MATCHERS: &[CodeMatcher] = &[
    CodeMatcher::tag_inside("code", "pre"),
    CodeMatcher::tag("pre"),
    CodeMatcher::tag("code"),
    CodeMatcher::class(ClassRule::Token("highlight")),
    CodeMatcher::class(ClassRule::Token("code-block")),
    CodeMatcher::class(ClassRule::Token("codehilite")),
    CodeMatcher::class(ClassRule::Contains("language-")),
    CodeMatcher::class(ClassRule::Contains("highlight-")),
];

pub fn collect_code_blocks(document: &Html) -> Vec<CodeBlock> {
    collect_with(document, CODE_MATCHERS)
}

pub fn collect_with(document: &Html, matchers: &[CodeMatcher]) -> Vec<CodeBlock> {
    let elements: Vec<ElementRef<'_>> = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .collect();

    let mut visited = HashSet::new();
    let mut blocks = Vec::new();

    for matcher in matchers {
        for element in elements.iter().copied().filter(|el| matcher.matches(el)) {
            let owner = matcher.owner(element);
            let seen = visited.contains(&element.id()) || visited.contains(&owner.id());
            visited.insert(element.id());
            visited.insert(owner.id());
            if seen {
                continue;
            }
            if let Some(block) = code_block(owner) {
                blocks.push(block);
            }
        }
    }

    blocks
}

fn code_block(element: ElementRef<'_>) -> Option<CodeBlock> {
    let text: String = element.text().collect();
    let content = text.trim();
    if content.is_empty() {
        return None;
    }

    let name = element.value().name();
    let mut language = language_from_classes(class_list(element));
    if language.is_none() && name == "pre" {
        language = element
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|child| child.value().name() == "code")
            .and_then(|code| language_from_classes(class_list(code)));
    }

    Some(CodeBlock {
        language,
        content: content.to_string(),
        tag: name.to_string(),
    })
}

/// First class that names a language, either through a `language-`,
/// `lang-` or `highlight-` prefix or by being a known language name.
pub fn language_from_classes<'a>(classes: impl IntoIterator<Item = &'a str>) -> Option<String> {
    classes.into_iter().find_map(|class| {
        if LANGUAGE_PREFIXES.iter().any(|prefix| class.starts_with(prefix)) {
            class.split_once('-').map(|(_, rest)| rest.to_string())
        } else if KNOWN_LANGUAGES.contains(&class) {
            Some(class.to_string())
        } else {
            None
        }
    })
}

fn class_list(element: ElementRef<'_>) -> impl Iterator<Item = &'_ str> {
    element
        .value()
        .attr("class")
        .unwrap_or_default()
        .split_ascii_whitespace()
}

fn nearest_ancestor<'a>(element: &ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == tag)
}
