//! Core types for Clean

use chrono::{DateTime, FixedOffset, SecondsFormat};
use schemars::JsonSchema;
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

/// Fields pulled out of a page by an [`Extractor`](crate::Extractor)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Article {
    /// Headline, possibly empty
    pub title: String,
    /// Main body text, possibly empty
    pub text: String,
    /// Absolute URL of the lead image, possibly empty
    pub top_image: String,
    /// Publication time, if the page declares one
    pub publish_date: Option<DateTime<FixedOffset>>,
    /// Author names in document order
    pub authors: Vec<String>,
}

/// Successful extraction as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ParsedArticle {
    /// Always `true`
    #[serde(deserialize_with = "ok_true")]
    #[schemars(with = "bool")]
    ok: bool,
    pub title: String,
    pub text: String,
    pub top_image: String,
    /// ISO-8601 date-time, `null` when undetermined
    pub publish_date: Option<String>,
    pub authors: Vec<String>,
    /// The URL as requested
    pub url: String,
}

/// Failed fetch or extraction as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FailedArticle {
    /// Always `false`
    #[serde(deserialize_with = "ok_false")]
    #[schemars(with = "bool")]
    ok: bool,
    /// Human readable reason
    pub error: String,
    /// The URL as requested
    pub url: String,
}

/// Outcome for one requested URL
///
/// Serializes to either
/// `{"ok": true, "title", "text", "top_image", "publish_date", "authors", "url"}`
/// or `{"ok": false, "error", "url"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ArticleResult {
    Parsed(ParsedArticle),
    Failed(FailedArticle),
}

impl ArticleResult {
    /// Build a success record from extracted fields
    pub fn parsed(url: impl Into<String>, article: Article) -> Self {
        ArticleResult::Parsed(ParsedArticle {
            ok: true,
            title: article.title,
            text: article.text,
            top_image: article.top_image,
            publish_date: article.publish_date.map(|date| iso_format(&date)),
            authors: article.authors,
            url: url.into(),
        })
    }

    /// Build a failure record
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        ArticleResult::Failed(FailedArticle {
            ok: false,
            error: error.into(),
            url: url.into(),
        })
    }

    /// True for success records
    pub fn is_ok(&self) -> bool {
        matches!(self, ArticleResult::Parsed(_))
    }

    /// The URL this record answers for
    pub fn url(&self) -> &str {
        match self {
            ArticleResult::Parsed(parsed) => &parsed.url,
            ArticleResult::Failed(failed) => &failed.url,
        }
    }

    /// Error message for failure records
    pub fn error(&self) -> Option<&str> {
        match self {
            ArticleResult::Parsed(_) => None,
            ArticleResult::Failed(failed) => Some(&failed.error),
        }
    }
}

/// Error object returned when a whole request is rejected
///
/// Carries no `url` since it does not answer for any single article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RequestError {
    /// Always `false`
    #[serde(deserialize_with = "ok_false")]
    #[schemars(with = "bool")]
    ok: bool,
    pub error: String,
}

impl RequestError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }
}

fn ok_true<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    expect_ok(deserializer, true)
}

fn ok_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    expect_ok(deserializer, false)
}

/// `ok` is the discriminant of the untagged records, so it must match
fn expect_ok<'de, D: Deserializer<'de>>(
    deserializer: D,
    expected: bool,
) -> Result<bool, D::Error> {
    let ok = bool::deserialize(deserializer)?;
    if ok != expected {
        let wanted = if expected { "true" } else { "false" };
        return Err(de::Error::invalid_value(Unexpected::Bool(ok), &wanted));
    }
    Ok(ok)
}

/// Render a date the way `datetime.isoformat()` does for aware values
pub(crate) fn iso_format(date: &DateTime<FixedOffset>) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}
