//! Metadata extraction from HTML documents (meta tags, JSON-LD, microdata)

use super::text::{collapse_whitespace, visible_text};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use url::Url;

const TITLE_KEYS: &[&str] = &["og:title", "twitter:title"];

const IMAGE_KEYS: &[&str] = &[
    "og:image",
    "og:image:url",
    "og:image:secure_url",
    "twitter:image",
    "twitter:image:src",
];

const DATE_KEYS: &[&str] = &[
    "article:published_time",
    "og:published_time",
    "datepublished",
    "pubdate",
    "publishdate",
    "publish-date",
    "publication_date",
    "sailthru.date",
    "dc.date",
    "dc.date.issued",
    "date",
];

const AUTHOR_KEYS: &[&str] = &["author", "article:author", "dc.creator", "sailthru.author"];

/// Offset-aware formats not covered by RFC 3339
const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%z",
];

/// Date-times without an offset, read as UTC
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Plain dates, read as midnight UTC
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
];

/// Metadata sources of one document, read once
pub(crate) struct PageMetadata {
    /// (lowercased key, content) of every `<meta>` with a content attribute
    metas: Vec<(String, String)>,
    /// JSON-LD objects, article types first
    json_ld: Vec<Value>,
}

impl PageMetadata {
    pub(crate) fn read(document: &Html) -> Self {
        Self {
            metas: read_meta_tags(document),
            json_ld: read_json_ld(document),
        }
    }

    /// First non-empty meta value for any of `keys`, in key order
    fn meta(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| {
            self.metas
                .iter()
                .find(|(k, v)| k.as_str() == *key && !v.trim().is_empty())
                .map(|(_, v)| v.trim())
        })
    }

    /// Every non-empty meta value for any of `keys`
    fn meta_all<'a>(&'a self, keys: &'a [&'a str]) -> impl Iterator<Item = &'a str> + 'a {
        self.metas
            .iter()
            .filter(move |(k, v)| keys.contains(&k.as_str()) && !v.trim().is_empty())
            .map(|(_, v)| v.trim())
    }

    /// First string found at `key` in the JSON-LD objects
    fn ld_str(&self, key: &str) -> Option<String> {
        self.json_ld
            .iter()
            .filter_map(|obj| obj.get(key).and_then(Value::as_str))
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }

    pub(crate) fn title(&self, document: &Html) -> String {
        self.meta(TITLE_KEYS)
            .map(str::to_string)
            .or_else(|| self.ld_str("headline"))
            .or_else(|| first_text(document, "title"))
            .or_else(|| first_text(document, "h1"))
            .map(|title| collapse_whitespace(&title))
            .unwrap_or_default()
    }

    pub(crate) fn top_image(
        &self,
        container: Option<ElementRef<'_>>,
        page_url: &str,
    ) -> Option<String> {
        let candidate = self
            .meta(IMAGE_KEYS)
            .map(str::to_string)
            .or_else(|| {
                self.json_ld
                    .iter()
                    .find_map(|obj| obj.get("image").and_then(ld_image))
            })
            .or_else(|| container.and_then(first_image_src));

        candidate.map(|src| resolve_url(page_url, &src))
    }

    pub(crate) fn publish_date(
        &self,
        document: &Html,
        page_url: &str,
    ) -> Option<DateTime<FixedOffset>> {
        DATE_KEYS
            .iter()
            .filter_map(|key| self.meta(&[*key]))
            .find_map(parse_date)
            .or_else(|| self.ld_str("datePublished").as_deref().and_then(parse_date))
            .or_else(|| {
                select_all(document, "time[datetime]")
                    .into_iter()
                    .filter_map(|el| el.value().attr("datetime"))
                    .find_map(parse_date)
            })
            .or_else(|| date_from_url(page_url))
    }

    pub(crate) fn authors(&self, document: &Html) -> Vec<String> {
        let mut raw: Vec<String> = Vec::new();

        for obj in &self.json_ld {
            if let Some(author) = obj.get("author") {
                collect_ld_authors(author, &mut raw);
            }
        }

        raw.extend(
            self.meta_all(AUTHOR_KEYS)
                .filter(|value| !is_url(value))
                .map(str::to_string),
        );

        for el in select_all(document, "[rel~=author]") {
            raw.push(visible_text(el));
        }

        for el in select_all(document, "[itemprop~=author]") {
            if el.value().name() == "meta" || el.value().name() == "link" {
                continue;
            }
            let name = select_all_in(el, "[itemprop~=name]")
                .into_iter()
                .next()
                .map(visible_text)
                .unwrap_or_else(|| visible_text(el));
            raw.push(name);
        }

        normalize_authors(raw)
    }
}

fn select_all<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

fn select_all_in<'a>(element: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => element.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    select_all(document, css)
        .into_iter()
        .map(visible_text)
        .find(|text| !text.trim().is_empty())
}

fn read_meta_tags(document: &Html) -> Vec<(String, String)> {
    let mut metas = Vec::new();
    for el in select_all(document, "meta[content]") {
        let element = el.value();
        let Some(content) = element.attr("content") else {
            continue;
        };
        for attr in ["property", "name", "itemprop"] {
            if let Some(key) = element.attr(attr) {
                metas.push((key.trim().to_lowercase(), content.to_string()));
            }
        }
    }
    metas
}

fn read_json_ld(document: &Html) -> Vec<Value> {
    let mut objects = Vec::new();

    for script in select_all(document, "script[type='application/ld+json']") {
        let content = script.text().collect::<String>();
        let content = content
            .trim()
            .trim_start_matches("<![CDATA[")
            .trim_end_matches("]]>")
            .trim();

        if let Ok(parsed) = serde_json::from_str::<Value>(content) {
            flatten_json_ld(parsed, &mut objects);
        }
    }

    // Article-typed objects win over WebSite/Organization noise
    let (mut articles, rest): (Vec<Value>, Vec<Value>) =
        objects.into_iter().partition(is_article_type);
    articles.extend(rest);
    articles
}

fn flatten_json_ld(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_json_ld(item, out);
            }
        }
        Value::Object(mut map) => {
            if let Some(graph) = map.remove("@graph") {
                flatten_json_ld(graph, out);
            }
            if !map.is_empty() {
                out.push(Value::Object(map));
            }
        }
        _ => {}
    }
}

fn is_article_type(value: &Value) -> bool {
    let is_article = |t: &str| t.ends_with("Article") || t == "BlogPosting" || t == "Report";
    match value.get("@type") {
        Some(Value::String(t)) => is_article(t.as_str()),
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).any(is_article),
        _ => false,
    }
}

fn ld_image(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(obj) => obj
            .get("url")
            .or_else(|| obj.get("contentUrl"))
            .and_then(ld_image),
        Value::Array(items) => items.iter().find_map(ld_image),
        _ => None,
    }
}

fn collect_ld_authors(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Object(obj) => {
            if let Some(name) = obj.get("name").and_then(Value::as_str) {
                out.push(name.to_string());
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_ld_authors(item, out);
            }
        }
        _ => {}
    }
}

fn first_image_src(container: ElementRef<'_>) -> Option<String> {
    select_all_in(container, "img[src]")
        .into_iter()
        .filter_map(|img| img.value().attr("src"))
        .map(str::trim)
        .find(|src| !src.is_empty() && !src.starts_with("data:"))
        .map(str::to_string)
}

fn resolve_url(base: &str, src: &str) -> String {
    Url::parse(base)
        .and_then(|base| base.join(src))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| src.to_string())
}

fn is_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Split bylines, strip "By", drop duplicates (case-insensitive), keep order
fn normalize_authors(raw: Vec<String>) -> Vec<String> {
    let mut authors: Vec<String> = Vec::new();

    for byline in raw {
        let byline = collapse_whitespace(&byline);
        let byline = strip_by_prefix(&byline);
        for name in split_byline(byline) {
            let name = name.trim().trim_end_matches(',').trim();
            if name.is_empty() || name.len() > 100 || is_url(name) {
                continue;
            }
            if !authors.iter().any(|a| a.eq_ignore_ascii_case(name)) {
                authors.push(name.to_string());
            }
        }
    }

    authors
}

fn strip_by_prefix(byline: &str) -> &str {
    let lower = byline.to_ascii_lowercase();
    if lower.starts_with("by ") {
        byline[3..].trim_start()
    } else {
        byline
    }
}

fn split_byline(byline: &str) -> Vec<&str> {
    byline
        .split(", ")
        .flat_map(|part| part.split(" and "))
        .flat_map(|part| part.split(" & "))
        .collect()
}

/// Parse the date formats seen in the wild into an offset-aware value
pub(crate) fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date);
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(raw) {
        return Some(date);
    }
    if let Some(date) = ZONED_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(date);
    }
    if let Some(date) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(date.and_utc().fixed_offset());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc().fixed_offset())
}

/// `/2020/07/01/` style dates in the URL path
fn date_from_url(page_url: &str) -> Option<DateTime<FixedOffset>> {
    let url = Url::parse(page_url).ok()?;
    let segments: Vec<&str> = url.path_segments()?.collect();

    segments.windows(3).find_map(|window| {
        let [year, month, day] = window else {
            return None;
        };
        if year.len() != 4 || month.len() != 2 || day.len() != 2 {
            return None;
        }
        let year: i32 = year.parse().ok()?;
        if !(1900..2100).contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)?
            .and_hms_opt(0, 0, 0)
            .map(|date| date.and_utc().fixed_offset())
    })
}
