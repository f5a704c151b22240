//! Article extraction
//!
//! Design: extraction is a synchronous, CPU-bound step behind the
//! [`Extractor`] trait. The article task runs it on the blocking pool, so
//! implementations are free to take their time without stalling the
//! fetches of sibling tasks.
//!
//! [`HtmlExtractor`] is the built-in implementation. It reads the usual
//! metadata sources (Open Graph, Twitter cards, JSON-LD, `<meta>` and
//! microdata) and takes the body text from the paragraphs of the main
//! content container.

mod metadata;
mod text;

pub use text::clean_whitespace;

use crate::error::ExtractError;
use crate::types::Article;
use metadata::PageMetadata;
use scraper::Html;

/// Trait for article extractors
pub trait Extractor: Send + Sync {
    /// Identifier for logging
    fn name(&self) -> &'static str;

    /// Extract article fields from a page
    ///
    /// `url` is the page address, used to resolve relative links and as a
    /// last-resort source for the publish date.
    fn extract(&self, url: &str, html: &str) -> Result<Article, ExtractError>;
}

/// Default extractor built on `scraper`
#[derive(Debug, Clone, Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    /// Create a new extractor
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for HtmlExtractor {
    fn name(&self) -> &'static str {
        "html"
    }

    fn extract(&self, url: &str, html: &str) -> Result<Article, ExtractError> {
        // Zero-length bodies are the only input that does not parse
        if html.is_empty() {
            return Err(ExtractError::EmptyDocument);
        }

        let document = Html::parse_document(html);
        let meta = PageMetadata::read(&document);
        let container = text::main_container(&document);

        Ok(Article {
            title: meta.title(&document),
            text: container.map(text::article_text).unwrap_or_default(),
            top_image: meta.top_image(container, url).unwrap_or_default(),
            publish_date: meta.publish_date(&document, url),
            authors: meta.authors(&document),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::iso_format;

    #[test]
    fn test_minimal_document() {
        let html = "<html><title>Hi</title><body>Hello world</body></html>";
        let article = HtmlExtractor::new()
            .extract("https://example.com/a", html)
            .unwrap();

        assert_eq!(article.title, "Hi");
        assert_eq!(article.text, "Hello world");
        assert_eq!(article.top_image, "");
        assert!(article.publish_date.is_none());
        assert!(article.authors.is_empty());
    }

    #[test]
    fn test_full_article() {
        let html = r#"<!DOCTYPE html>
<html>
<head>
  <title>Pointing and Calling | Example Times</title>
  <meta property="og:title" content="Pointing and Calling">
  <meta property="og:image" content="/img/lead.jpg">
  <meta property="article:published_time" content="2020-07-01T09:30:00+02:00">
  <meta name="author" content="Jane Doe">
  <script type="application/ld+json">
    {"@context": "https://schema.org", "@type": "NewsArticle",
     "headline": "Ignored headline",
     "author": [{"@type": "Person", "name": "Jane Doe"}, {"@type": "Person", "name": "John Roe"}]}
  </script>
</head>
<body>
  <nav><p>Home | World | Sports</p></nav>
  <article>
    <h1>Pointing and Calling</h1>
    <p>Japanese train conductors point at things.</p>
    <p>It   reduces
       errors.</p>
    <script>track();</script>
  </article>
  <footer><p>Copyright Example Times</p></footer>
</body>
</html>"#;

        let article = HtmlExtractor::new()
            .extract("https://example.com/news/pointing", html)
            .unwrap();

        assert_eq!(article.title, "Pointing and Calling");
        assert_eq!(
            article.text,
            "Japanese train conductors point at things.\n\nIt reduces errors."
        );
        assert_eq!(article.top_image, "https://example.com/img/lead.jpg");
        assert_eq!(
            iso_format(&article.publish_date.unwrap()),
            "2020-07-01T09:30:00+02:00"
        );
        assert_eq!(article.authors, vec!["Jane Doe", "John Roe"]);
    }

    #[test]
    fn test_empty_body_is_error() {
        let result = HtmlExtractor::new().extract("https://example.com", "");
        assert!(matches!(result, Err(ExtractError::EmptyDocument)));
    }

    #[test]
    fn test_textless_document_is_empty_article() {
        let article = HtmlExtractor::new()
            .extract("https://example.com", "<html><body>  </body></html>")
            .unwrap();
        assert_eq!(article, Article::default());
    }

    #[test]
    fn test_image_only_document_keeps_image() {
        let article = HtmlExtractor::new()
            .extract(
                "https://example.com/post",
                r#"<html><body><img src="/a.png"></body></html>"#,
            )
            .unwrap();

        assert!(article.title.is_empty());
        assert!(article.text.is_empty());
        assert_eq!(article.top_image, "https://example.com/a.png");
    }

    #[test]
    fn test_title_only_is_not_error() {
        let article = HtmlExtractor::new()
            .extract("https://example.com", "<title>Only a title</title>")
            .unwrap();
        assert_eq!(article.title, "Only a title");
        assert!(article.text.is_empty());
    }

    #[test]
    fn test_non_html_input_is_treated_as_text() {
        let article = HtmlExtractor::new()
            .extract("https://example.com", "just some plain text")
            .unwrap();
        assert_eq!(article.text, "just some plain text");
    }
}
