//! Body text extraction

use scraper::{ElementRef, Html, Selector};

/// Candidate main-content containers, most specific first
const CONTAINER_SELECTORS: &[&str] = &[
    "[itemprop~=articleBody]",
    "article",
    "[role=main]",
    "main",
    "body",
];

/// Elements whose text is never visible
const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template", "iframe", "svg"];

/// Page chrome around the article
const BOILERPLATE_TAGS: &[&str] = &["nav", "header", "footer", "aside", "form"];

/// Elements that break lines when flattened to text
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "section", "blockquote",
    "pre",
];

/// Pick the element that most likely holds the article
pub(crate) fn main_container(document: &Html) -> Option<ElementRef<'_>> {
    CONTAINER_SELECTORS.iter().find_map(|css| {
        let selector = Selector::parse(css).ok()?;
        document.select(&selector).next()
    })
}

/// Paragraph text of a container, or all its visible text if it has none
pub(crate) fn article_text(container: ElementRef<'_>) -> String {
    let paragraphs: Vec<String> = Selector::parse("p")
        .map(|selector| {
            container
                .select(&selector)
                .filter(|p| !inside_boilerplate(*p, container))
                .map(|p| collapse_whitespace(&visible_text(p)))
                .filter(|text| !text.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if paragraphs.is_empty() {
        clean_whitespace(&visible_text(container))
    } else {
        paragraphs.join("\n\n")
    }
}

/// Visible text of an element, block elements separated by newlines
///
/// Page chrome (nav, header, footer, ...) below `element` is left out.
pub(crate) fn visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_visible_text(element, &mut out);
    out
}

fn push_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            let name = child.value().name();
            if SKIP_TAGS.contains(&name) || BOILERPLATE_TAGS.contains(&name) {
                continue;
            }
            let block = BLOCK_TAGS.contains(&name);
            if block {
                out.push('\n');
            }
            push_visible_text(child, out);
            if block {
                out.push('\n');
            }
        }
    }
}

/// True if `element` sits in nav/footer/... below `container`
fn inside_boilerplate(element: ElementRef<'_>, container: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .take_while(|node| node.id() != container.id())
        .filter_map(ElementRef::wrap)
        .any(|ancestor| BOILERPLATE_TAGS.contains(&ancestor.value().name()))
}

/// Collapse all whitespace runs to single spaces
pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Clean whitespace: collapse runs, trim, keep max 2 newlines
pub fn clean_whitespace(s: &str) -> String {
    let mut result = String::new();
    let mut last_was_space = false;
    let mut newline_count = 0;

    for c in s.chars() {
        if c == '\n' {
            // Remove trailing space before newline
            if last_was_space && result.ends_with(' ') {
                result.pop();
            }
            newline_count += 1;
            last_was_space = true;
            if newline_count <= 2 {
                result.push(c);
            }
        } else if c.is_whitespace() {
            if !last_was_space {
                result.push(' ');
                last_was_space = true;
            }
        } else {
            newline_count = 0;
            last_was_space = false;
            result.push(c);
        }
    }

    result.trim().to_string()
}
