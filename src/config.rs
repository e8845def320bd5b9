use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Configuration for the crawl frontier and HTTP fetching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Maximum number of pages to audit (clamped to at least 1)
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Links taken from a single page, in document order
    #[serde(default = "default_max_links_per_page")]
    pub max_links_per_page: usize,

    /// Path suffixes that are never followed
    #[serde(default = "default_non_html_extensions")]
    pub non_html_extensions: Vec<String>,
}

/// Category weights; they sum to 100
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub indexability: f64,
    pub metadata: f64,
    pub structure: f64,
    pub structured_data: f64,
    pub content_depth: f64,
    pub policy: f64,
    pub sitemap: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            indexability: 15.0,
            metadata: 20.0,
            structure: 20.0,
            structured_data: 15.0,
            content_depth: 15.0,
            policy: 10.0,
            sitemap: 5.0,
        }
    }
}

/// Configuration for the scoring model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: CategoryWeights,

    /// Reading ease that earns the full readability reward
    #[serde(default = "default_readability_target")]
    pub readability_target: f64,

    /// Schema types that earn the structured data bonus (exact case)
    #[serde(default = "default_target_schema_types")]
    pub target_schema_types: Vec<String>,
}

/// Configuration for keyword salience
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordConfig {
    #[serde(default = "default_max_per_page")]
    pub max_per_page: usize,

    #[serde(default = "default_max_site")]
    pub max_site: usize,

    /// Tokens shorter than this are dropped
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,

    #[serde(default = "default_stop_words")]
    pub stop_words: Vec<String>,
}

/// Top-level audit configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default)]
    pub crawl: CrawlConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub keywords: KeywordConfig,
}

impl AuditConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            max_links_per_page: default_max_links_per_page(),
            non_html_extensions: default_non_html_extensions(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: CategoryWeights::default(),
            readability_target: default_readability_target(),
            target_schema_types: default_target_schema_types(),
        }
    }
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            max_per_page: default_max_per_page(),
            max_site: default_max_site(),
            min_token_len: default_min_token_len(),
            stop_words: default_stop_words(),
        }
    }
}

fn default_max_pages() -> usize {
    1
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    "llmseo-tool/0.1 (+https://example.com)".to_string()
}

fn default_max_links_per_page() -> usize {
    50
}

fn default_non_html_extensions() -> Vec<String> {
    [
        ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".ico", ".css", ".js", ".pdf", ".zip",
        ".mp4", ".mp3", ".mov", ".avi",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_readability_target() -> f64 {
    60.0
}

fn default_target_schema_types() -> Vec<String> {
    ["FAQPage", "Article", "Product", "Organization", "WebSite", "HowTo"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_max_per_page() -> usize {
    10
}

fn default_max_site() -> usize {
    12
}

fn default_min_token_len() -> usize {
    4
}

fn default_stop_words() -> Vec<String> {
    STOP_WORDS.iter().map(|s| s.to_string()).collect()
}

const STOP_WORDS: &[&str] = &[
    "the", "that", "with", "this", "from", "have", "your", "about", "their", "there", "will",
    "would", "could", "should", "into", "while", "where", "these", "those", "what", "when",
    "which", "were", "been", "them", "they", "also", "than", "then", "over", "such", "only",
    "some", "more", "most", "many", "each", "other", "ours", "ourselves", "yours", "itself", "it",
    "here", "make", "made", "just", "very", "much", "like", "does", "doesn", "again", "even",
    "through", "within", "across", "because", "after", "before", "under", "above", "upon", "once",
    "every", "being", "same", "another", "including", "include", "between", "might", "shall",
];
