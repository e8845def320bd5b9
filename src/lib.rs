// Re-export modules
pub mod config;
pub mod crawlers;
pub mod error;
pub mod filter;
pub mod keywords;
pub mod parsers;
pub mod policy;
pub mod query;
pub mod results;
pub mod scoring;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::AuditConfig;
pub use crawlers::{FetchResponse, Fetcher, HttpFetcher, SiteCrawler};
pub use error::{AuditError, Result};
pub use policy::PolicyDraft;
pub use results::{KeywordInsight, KeywordSummary, PageRecord, SiteAuditResult};

/// Main builder for running a discoverability audit
pub struct Audit {
    url: String,
    config: AuditConfig,
}

impl Audit {
    /// Create a new audit for the given seed URL with default configuration
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            config: AuditConfig::default(),
        }
    }

    /// Set the maximum number of pages to crawl
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.config.crawl.max_pages = max_pages;
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.config.crawl.timeout_secs = timeout_seconds;
        self
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: AuditConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a file
    pub fn with_config_file(self, path: impl AsRef<std::path::Path>) -> Result<Self> {
        let config = AuditConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a string
    pub fn with_config_str(self, config_str: &str) -> Result<Self> {
        let config = AuditConfig::from_json(config_str)?;
        Ok(self.with_config(config))
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Run the audit over HTTP
    pub async fn run(self) -> Result<SiteAuditResult> {
        crawlers::audit_site(&self.url, &self.config).await
    }

    /// Run the audit with a caller-supplied fetcher
    pub async fn run_with<F: Fetcher>(self, fetcher: &F) -> Result<SiteAuditResult> {
        SiteCrawler::new(&self.config)?.crawl(fetcher, &self.url).await
    }
}
