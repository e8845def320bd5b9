use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Word, sentence and syllable counts for a page's visible text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStats {
    pub word_count: usize,
    pub unique_word_count: usize,
    pub sentence_count: usize,
    pub syllable_count: usize,
    pub avg_sentence_length: f64,
}

/// H1/H2/H3 inner contents in document order. All three levels are always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Headings {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
}

impl Headings {
    /// Iterate every heading regardless of level
    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.h1.iter().chain(self.h2.iter()).chain(self.h3.iter())
    }
}

/// Weighted contribution of each scoring category
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub indexability: f64,
    pub metadata: f64,
    pub structure: f64,
    pub structured_data: f64,
    pub content_depth: f64,
    pub policy: f64,
    pub sitemap: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.indexability
            + self.metadata
            + self.structure
            + self.structured_data
            + self.content_depth
            + self.policy
            + self.sitemap
    }

    /// Apply `f` to every category value
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            indexability: f(self.indexability),
            metadata: f(self.metadata),
            structure: f(self.structure),
            structured_data: f(self.structured_data),
            content_depth: f(self.content_depth),
            policy: f(self.policy),
            sitemap: f(self.sitemap),
        }
    }

    /// Category-wise sum
    pub fn add(&self, other: &Self) -> Self {
        Self {
            indexability: self.indexability + other.indexability,
            metadata: self.metadata + other.metadata,
            structure: self.structure + other.structure,
            structured_data: self.structured_data + other.structured_data,
            content_depth: self.content_depth + other.content_depth,
            policy: self.policy + other.policy,
            sitemap: self.sitemap + other.sitemap,
        }
    }

    /// `(category name, value)` pairs in reporting order
    pub fn entries(&self) -> [(&'static str, f64); 7] {
        [
            ("indexability", self.indexability),
            ("metadata", self.metadata),
            ("structure", self.structure),
            ("structured_data", self.structured_data),
            ("content_depth", self.content_depth),
            ("policy", self.policy),
            ("sitemap", self.sitemap),
        ]
    }
}

/// Salience of a single term on one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordInsight {
    pub term: String,
    /// 0-100, one decimal
    pub score: f64,
    pub frequency: usize,
    pub in_title: bool,
    pub in_headings: bool,
    pub in_description: bool,
}

/// Salience of a term averaged across the pages that contain it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordSummary {
    pub term: String,
    pub score: f64,
    pub pages: usize,
}

/// Everything extracted and computed for one fetched page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageRecord {
    /// Normalized absolute URL, unique within a crawl
    pub url: String,

    /// HTTP status, 0 when the fetch failed
    pub status_code: u16,

    pub title: Option<String>,
    pub description: Option<String>,
    pub canonical_url: Option<String>,

    /// `og:*` properties keyed without the `og:` prefix
    pub open_graph_tags: BTreeMap<String, String>,

    pub has_lang_attribute: bool,
    pub headings: Headings,

    /// Schema types in first-seen order, deduplicated
    pub json_ld_types: Vec<String>,
    pub has_faq_schema: bool,

    pub text_stats: TextStats,

    /// Flesch reading ease; unclamped, 0.0 for empty text
    pub reading_ease: f64,

    pub meta_robots_directive: Option<String>,
    pub blocked_by_robots: bool,
    pub semantic_tags_present: Vec<String>,

    pub keywords: Vec<KeywordInsight>,
    pub score: f64,
    pub score_breakdown: ScoreBreakdown,
    pub recommendations: Vec<String>,
}

impl PageRecord {
    /// Create an empty record for a URL
    pub fn new(url: String, status_code: u16) -> Self {
        Self {
            url,
            status_code,
            ..Self::default()
        }
    }

    /// Open Graph value by key; accepts both `title` and `og:title`
    pub fn og(&self, key: &str) -> Option<&str> {
        let key = key.strip_prefix("og:").unwrap_or(key);
        self.open_graph_tags
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn has_noindex_or_nofollow(&self) -> bool {
        self.meta_robots_directive.as_deref().is_some_and(|d| {
            let d = d.to_lowercase();
            d.contains("noindex") || d.contains("nofollow")
        })
    }
}

/// Aggregate over a crawl
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteAuditResult {
    pub base_url: String,
    pub robots_txt_body: Option<String>,
    pub sitemap_urls: Vec<String>,
    pub llm_policy_found: bool,
    pub llm_policy_url: Option<String>,
    pub llm_policy_body: Option<String>,
    pub pages: Vec<PageRecord>,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub recommendations: Vec<String>,
    pub keywords: Vec<KeywordSummary>,
}

impl SiteAuditResult {
    /// Create an empty result for a normalized seed URL
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            ..Self::default()
        }
    }

    /// The seed page, if it was crawled
    pub fn primary_page(&self) -> Option<&PageRecord> {
        self.pages.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_og_lookup_accepts_prefixed_key() {
        let mut page = PageRecord::new("https://example.com/".to_string(), 200);
        page.open_graph_tags
            .insert("title".to_string(), "Hello".to_string());
        page.open_graph_tags
            .insert("description".to_string(), String::new());

        assert_eq!(page.og("og:title"), Some("Hello"));
        assert_eq!(page.og("title"), Some("Hello"));
        assert_eq!(page.og("description"), None);
    }

    #[test]
    fn test_breakdown_serializes_with_category_keys() {
        let json = serde_json::to_value(ScoreBreakdown::default()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 7);
        for (name, _) in ScoreBreakdown::default().entries() {
            assert!(obj.contains_key(name), "missing key {}", name);
        }
    }

    #[test]
    fn test_meta_robots_detection_is_case_insensitive() {
        let mut page = PageRecord::new("https://example.com/".to_string(), 200);
        assert!(!page.has_noindex_or_nofollow());
        page.meta_robots_directive = Some("index, NOFOLLOW".to_string());
        assert!(page.has_noindex_or_nofollow());
    }
}
