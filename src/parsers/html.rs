use crate::error::{AuditError, Result};
use crate::parsers::{HtmlFeatureExtractor, JsonLdSummary, MetaTags};
use crate::results::Headings;
use crate::utils::to_absolute;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use url::Url;

const SEMANTIC_TAGS: [&str; 7] = ["article", "section", "nav", "aside", "main", "header", "footer"];

/// `@type` of a JSON-LD node: a single name, a list of names, or something unusable
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<serde_json::Value>),
    Other(serde_json::Value),
}

impl SchemaType {
    pub fn into_names(self) -> Vec<String> {
        match self {
            SchemaType::Single(name) => vec![name],
            SchemaType::Multiple(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(name) => Some(name),
                    _ => None,
                })
                .collect(),
            SchemaType::Other(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JsonLdNode {
    #[serde(rename = "@type", default)]
    schema_type: Option<SchemaType>,
}

/// Tolerant pattern-matching extractor.
///
/// First match wins, matching is case-insensitive and entities are never
/// decoded. Anchors inside comments and scripts are found like any other.
#[derive(Debug)]
pub struct RegexFeatureExtractor {
    head: Regex,
    title: Regex,
    meta: Regex,
    link_tag: Regex,
    attr_name: Regex,
    attr_property: Regex,
    attr_content: Regex,
    attr_rel: Regex,
    attr_href: Regex,
    lang: Regex,
    h1: Regex,
    h2: Regex,
    h3: Regex,
    json_ld: Regex,
    semantic: Vec<(&'static str, Regex)>,
    anchor: Regex,
}

impl Default for RegexFeatureExtractor {
    fn default() -> Self {
        Self::new().expect("Built-in extraction patterns should be valid")
    }
}

impl RegexFeatureExtractor {
    /// Compile every extraction pattern
    pub fn new() -> Result<Self> {
        let semantic = SEMANTIC_TAGS
            .iter()
            .map(|tag| Ok((*tag, Regex::new(&format!(r"(?i)<\s*{}(\s|>)", tag))?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            head: Regex::new(r"(?i)<head[\s\S]*?</head>")?,
            title: Regex::new(r"(?i)<title>([\s\S]*?)</title>")?,
            meta: Regex::new(r"(?i)<meta[^>]+>")?,
            link_tag: Regex::new(r"(?i)<link[^>]+>")?,
            attr_name: attr_regex("name")?,
            attr_property: attr_regex("property")?,
            attr_content: attr_regex("content")?,
            attr_rel: attr_regex("rel")?,
            attr_href: attr_regex("href")?,
            lang: Regex::new(r"(?i)<html[^>]+lang=")?,
            h1: heading_regex("h1")?,
            h2: heading_regex("h2")?,
            h3: heading_regex("h3")?,
            json_ld: Regex::new(
                r#"(?i)<script[^>]+type=["']application/ld\+json["'][^>]*>([\s\S]*?)</script>"#,
            )?,
            semantic,
            anchor: Regex::new(r#"(?i)<a[^>]+href=["']([^"']+)["']"#)?,
        })
    }

    fn attr<'a>(re: &Regex, tag: &'a str) -> Option<&'a str> {
        re.captures(tag)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    fn capture_all(re: &Regex, html: &str) -> Vec<String> {
        re.captures_iter(html)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

fn attr_regex(attr: &str) -> Result<Regex> {
    Ok(Regex::new(&format!(r#"(?i){}=["']([^"']+)["']"#, attr))?)
}

fn heading_regex(tag: &str) -> Result<Regex> {
    Ok(Regex::new(&format!(r"(?i)<{tag}[^>]*>([\s\S]*?)</{tag}>"))?)
}

impl HtmlFeatureExtractor for RegexFeatureExtractor {
    fn head<'a>(&self, html: &'a str) -> &'a str {
        self.head.find(html).map(|m| m.as_str()).unwrap_or("")
    }

    fn title(&self, head: &str) -> Option<String> {
        self.title
            .captures(head)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
    }

    fn meta_tags(&self, head: &str) -> MetaTags {
        let mut metas = MetaTags::default();
        for m in self.meta.find_iter(head) {
            let tag = m.as_str();
            let content = Self::attr(&self.attr_content, tag).unwrap_or("");
            if let Some(name) = Self::attr(&self.attr_name, tag) {
                metas.insert(format!("name:{}", name.to_lowercase()), content);
            }
            if let Some(prop) = Self::attr(&self.attr_property, tag) {
                metas.insert(format!("prop:{}", prop.to_lowercase()), content);
            }
        }
        metas
    }

    fn canonical(&self, head: &str, page_url: &Url) -> Option<String> {
        self.link_tag
            .find_iter(head)
            .map(|m| m.as_str())
            .find(|tag| {
                Self::attr(&self.attr_rel, tag)
                    .is_some_and(|rel| rel.to_lowercase().contains("canonical"))
            })
            .and_then(|tag| Self::attr(&self.attr_href, tag))
            .and_then(|href| to_absolute(page_url, href))
            .map(|url| url.to_string())
    }

    fn has_lang_attribute(&self, html: &str) -> bool {
        self.lang.is_match(html)
    }

    fn headings(&self, html: &str) -> Headings {
        Headings {
            h1: Self::capture_all(&self.h1, html),
            h2: Self::capture_all(&self.h2, html),
            h3: Self::capture_all(&self.h3, html),
        }
    }

    fn json_ld(&self, html: &str) -> JsonLdSummary {
        let mut summary = JsonLdSummary::default();
        let mut seen = HashSet::new();

        for body in Self::capture_all(&self.json_ld, html) {
            let data: serde_json::Value = match serde_json::from_str(body.trim()) {
                Ok(data) => data,
                Err(e) => {
                    ::log::debug!("{}", AuditError::MalformedStructuredData(e.to_string()));
                    continue;
                }
            };

            let items = match data {
                serde_json::Value::Array(items) => items,
                other => vec![other],
            };

            for item in items {
                let Ok(node) = serde_json::from_value::<JsonLdNode>(item) else {
                    continue;
                };
                let names = node.schema_type.map(SchemaType::into_names).unwrap_or_default();
                for name in names {
                    if name.eq_ignore_ascii_case("faqpage") {
                        summary.has_faq_schema = true;
                    }
                    if seen.insert(name.clone()) {
                        summary.types.push(name);
                    }
                }
            }
        }

        summary
    }

    fn semantic_tags(&self, html: &str) -> Vec<String> {
        self.semantic
            .iter()
            .filter(|(_, re)| re.is_match(html))
            .map(|(tag, _)| tag.to_string())
            .collect()
    }

    fn links(&self, html: &str, page_url: &Url, limit: usize) -> Vec<Url> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for href in self
            .anchor
            .captures_iter(html)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
        {
            if links.len() >= limit {
                break;
            }
            let href = href.trim();
            if href.is_empty() || href.starts_with('#') {
                continue;
            }
            let lower = href.to_lowercase();
            if lower.starts_with("javascript:") || lower.starts_with("mailto:") {
                continue;
            }
            let Some(mut absolute) = to_absolute(page_url, href) else {
                continue;
            };
            absolute.set_fragment(None);
            if seen.insert(absolute.to_string()) {
                links.push(absolute);
            }
        }

        ::log::debug!("HTML parser found {} links on {}", links.len(), page_url);
        links
    }
}
