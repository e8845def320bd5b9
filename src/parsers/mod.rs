pub mod html;
pub mod text;


use crate::filter::RobotsRules;
use crate::results::{Headings, PageRecord};
use std::collections::BTreeMap;
use url::Url;

pub use html::RegexFeatureExtractor;

/// `<meta>` values keyed as `name:<lowercased name>` and `prop:<lowercased property>`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaTags(BTreeMap<String, String>);

impl MetaTags {
    pub fn insert(&mut self, key: String, value: &str) {
        self.0.insert(key, value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// `name:description`, falling back to `prop:og:description`
    pub fn description(&self) -> Option<String> {
        self.get("name:description")
            .filter(|v| !v.is_empty())
            .or_else(|| self.get("prop:og:description").filter(|v| !v.is_empty()))
            .map(str::to_string)
    }

    pub fn robots(&self) -> Option<String> {
        self.get("name:robots").map(str::to_string)
    }

    /// Every `og:*` property with the prefix stripped from the key
    pub fn open_graph(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .filter_map(|(k, v)| k.strip_prefix("prop:og:").map(|k| (k.to_string(), v.clone())))
            .collect()
    }
}

/// Schema types found in JSON-LD blocks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonLdSummary {
    /// First-seen order, deduplicated
    pub types: Vec<String>,
    pub has_faq_schema: bool,
}

/// One operation per page feature, so the pattern-matching extractor can be
/// replaced by a real tokenizer without touching page assembly.
pub trait HtmlFeatureExtractor {
    /// The `<head>…</head>` region, or "" when absent
    fn head<'a>(&self, html: &'a str) -> &'a str;

    /// First `<title>` content, trimmed
    fn title(&self, head: &str) -> Option<String>;

    fn meta_tags(&self, head: &str) -> MetaTags;

    /// First `<link rel=…canonical…>` href, resolved against the page URL
    fn canonical(&self, head: &str, page_url: &Url) -> Option<String>;

    fn has_lang_attribute(&self, html: &str) -> bool;

    fn headings(&self, html: &str) -> Headings;

    fn json_ld(&self, html: &str) -> JsonLdSummary;

    /// Semantic elements present in the document (presence, not count)
    fn semantic_tags(&self, html: &str) -> Vec<String>;

    /// Up to `limit` distinct absolute anchor targets with fragments stripped
    fn links(&self, html: &str, page_url: &Url, limit: usize) -> Vec<Url>;
}

/// Result of parsing one fetched page
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Extracted page state; keywords and scores are still defaults
    pub page: PageRecord,
    /// Visible text used for statistics and keywords
    pub content: String,
}

/// Turns raw HTML into a [`PageRecord`] using an [`HtmlFeatureExtractor`]
#[derive(Debug, Default)]
pub struct Parser<E = RegexFeatureExtractor> {
    extractor: E,
}

impl<E: HtmlFeatureExtractor> Parser<E> {
    pub fn new(extractor: E) -> Self {
        Self { extractor }
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    /// Extract every page feature except keywords and scores
    pub fn parse(&self, url: &Url, status_code: u16, html: &str, robots: &RobotsRules) -> ParseResult {
        let ex = &self.extractor;
        let head = ex.head(html);
        let metas = ex.meta_tags(head);
        let json_ld = ex.json_ld(html);

        let content = text::extract_visible_text(html);
        let text_stats = text::word_stats(&content);
        let reading_ease = text::flesch_reading_ease(
            text_stats.word_count,
            text_stats.sentence_count,
            text_stats.syllable_count,
        );

        let page = PageRecord {
            title: ex.title(head),
            description: metas.description(),
            canonical_url: ex.canonical(head, url),
            open_graph_tags: metas.open_graph(),
            has_lang_attribute: ex.has_lang_attribute(html),
            headings: ex.headings(html),
            json_ld_types: json_ld.types,
            has_faq_schema: json_ld.has_faq_schema,
            text_stats,
            reading_ease,
            meta_robots_directive: metas.robots(),
            blocked_by_robots: robots.is_blocked(url),
            semantic_tags_present: ex.semantic_tags(html),
            ..PageRecord::new(url.to_string(), status_code)
        };

        ::log::trace!(
            "Parsed {}: {} words, {} headings, {} schema types",
            url,
            page.text_stats.word_count,
            page.headings.all().count(),
            page.json_ld_types.len()
        );

        ParseResult { page, content }
    }

    /// Links worth considering for the crawl frontier
    pub fn links(&self, html: &str, url: &Url, limit: usize) -> Vec<Url> {
        self.extractor.links(html, url, limit)
    }
}
