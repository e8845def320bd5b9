use crate::config::{AuditConfig, CrawlConfig};
use crate::crawlers::crawler::{FetchResponse, Fetcher};
use crate::error::{AuditError, Result};
use crate::filter::{RobotsRules, UrlFilter};
use crate::keywords::KeywordEngine;
use crate::parsers::{HtmlFeatureExtractor, Parser, RegexFeatureExtractor};
use crate::results::{PageRecord, SiteAuditResult};
use crate::scoring::{self, Scorer};
use crate::utils::{normalize_url, origin_of};
use reqwest::Client;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use url::Url;

/// Well-known locations probed for an LLM policy file, in order
pub const LLM_POLICY_PATHS: [&str; 2] = ["/.well-known/llm.txt", "/llm.txt"];

/// [`Fetcher`] backed by a `reqwest` client with a fixed timeout and user agent
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AuditError::Config(e.to_string()))?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AuditError::fetch(url, e))?;

        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();
        let body = resp.text().await.map_err(|e| AuditError::fetch(url, e))?;

        Ok(FetchResponse {
            status,
            body,
            headers,
        })
    }
}

/// Sequential breadth-first auditor for one site.
///
/// Each call to [`SiteCrawler::crawl`] owns its own queue, visited set and
/// result; nothing is shared between audits.
#[derive(Debug)]
pub struct SiteCrawler<E = RegexFeatureExtractor> {
    crawl: CrawlConfig,
    parser: Parser<E>,
    keywords: KeywordEngine,
    scorer: Scorer,
}

impl SiteCrawler<RegexFeatureExtractor> {
    pub fn new(config: &AuditConfig) -> Result<Self> {
        Ok(Self::with_extractor(config, RegexFeatureExtractor::new()?))
    }
}

impl<E: HtmlFeatureExtractor> SiteCrawler<E> {
    /// Use a custom feature extractor
    pub fn with_extractor(config: &AuditConfig, extractor: E) -> Self {
        Self {
            crawl: config.crawl.clone(),
            parser: Parser::new(extractor),
            keywords: KeywordEngine::new(&config.keywords),
            scorer: Scorer::new(&config.scoring),
        }
    }

    /// Audit `seed_url` and up to `max_pages - 1` further same-origin pages.
    ///
    /// Only an unusable seed URL is an error; every fetch failure is recovered
    /// and reflected in the result.
    pub async fn crawl<F: Fetcher>(&self, fetcher: &F, seed_url: &str) -> Result<SiteAuditResult> {
        let root = normalize_url(seed_url)?;
        let max_pages = self.crawl.max_pages.max(1);
        let origin = origin_of(&root);
        ::log::info!("Starting audit of {} (max {} pages)", root, max_pages);

        let mut site = SiteAuditResult::new(root.to_string());

        let robots = self.load_robots(fetcher, &origin, &mut site).await;
        self.probe_llm_policy(fetcher, &origin, &mut site).await;

        let filter = UrlFilter::new(root.clone(), &self.crawl)?;
        site.pages = self.traverse(fetcher, &root, &filter, &robots, max_pages).await;

        self.scorer.score_site(&mut site);
        site.keywords = self.keywords.aggregate_keywords(&site.pages);
        scoring::derive_recommendations(&mut site);

        ::log::info!(
            "Audit of {} complete: {} pages, score {}",
            site.base_url,
            site.pages.len(),
            site.score
        );
        Ok(site)
    }

    async fn load_robots<F: Fetcher>(
        &self,
        fetcher: &F,
        origin: &str,
        site: &mut SiteAuditResult,
    ) -> RobotsRules {
        let robots_url = format!("{}/robots.txt", origin);
        match fetcher.fetch(&robots_url).await {
            Ok(resp) if resp.has_content() => {
                let rules = RobotsRules::parse(&resp.body);
                ::log::info!(
                    "robots.txt found: {} sitemaps, {} disallow rules",
                    rules.sitemaps.len(),
                    rules.disallow.len()
                );
                site.sitemap_urls = rules.sitemaps.clone();
                site.robots_txt_body = Some(resp.body);
                rules
            }
            Ok(resp) => {
                ::log::info!("No usable robots.txt at {} (status {})", robots_url, resp.status);
                RobotsRules::default()
            }
            Err(e) => {
                ::log::warn!("{}", e);
                RobotsRules::default()
            }
        }
    }

    async fn probe_llm_policy<F: Fetcher>(&self, fetcher: &F, origin: &str, site: &mut SiteAuditResult) {
        for path in LLM_POLICY_PATHS {
            let candidate = format!("{}{}", origin, path);
            match fetcher.fetch(&candidate).await {
                Ok(resp) if resp.has_content() => {
                    ::log::info!("LLM policy found at {}", candidate);
                    site.llm_policy_found = true;
                    site.llm_policy_url = Some(candidate);
                    site.llm_policy_body = Some(resp.body);
                    return;
                }
                Ok(resp) => {
                    ::log::debug!("No LLM policy at {} (status {})", candidate, resp.status);
                }
                Err(e) => {
                    ::log::debug!("{}", e);
                }
            }
        }
        ::log::info!("No LLM policy published under {}", origin);
    }

    async fn traverse<F: Fetcher>(
        &self,
        fetcher: &F,
        root: &Url,
        filter: &UrlFilter,
        robots: &RobotsRules,
        max_pages: usize,
    ) -> Vec<PageRecord> {
        let mut pages: Vec<PageRecord> = Vec::new();
        let mut queue: VecDeque<Url> = VecDeque::from([root.clone()]);
        let mut queued: HashSet<String> = HashSet::from([root.to_string()]);
        let mut visited: HashSet<String> = HashSet::new();

        while pages.len() < max_pages {
            let Some(current) = queue.pop_front() else {
                break;
            };
            let key = current.to_string();
            queued.remove(&key);
            if !visited.insert(key.clone()) {
                ::log::trace!("Skipping already visited: {}", key);
                continue;
            }

            let (status, html) = match fetcher.fetch(&key).await {
                Ok(resp) => (resp.status, resp.body),
                Err(e) => {
                    ::log::warn!("{}", e);
                    (0, String::new())
                }
            };
            ::log::info!("Fetched {} (status {})", key, status);

            let parsed = self.parser.parse(&current, status, &html, robots);
            let mut page = parsed.page;
            page.keywords = self.keywords.extract_keywords(
                &parsed.content,
                page.title.as_deref(),
                &page.headings,
                page.description.as_deref(),
            );
            pages.push(page);

            if html.is_empty() || pages.len() >= max_pages {
                continue;
            }

            for link in self.parser.links(&html, &current, self.crawl.max_links_per_page) {
                // Every queued URL becomes a page, so the frontier never needs
                // to hold more than the remaining page budget.
                if pages.len() + queue.len() >= max_pages {
                    break;
                }
                let link = filter.normalize_url(&link);
                let link_key = link.to_string();
                if link_key == key || visited.contains(&link_key) || queued.contains(&link_key) {
                    continue;
                }
                if !filter.should_crawl(&link) {
                    ::log::debug!("URL filter rejected: {}", link_key);
                    continue;
                }
                ::log::debug!("Queuing link for crawling: {}", link_key);
                queued.insert(link_key);
                queue.push_back(link);
            }
        }

        pages
    }
}

/// Audit a site over HTTP with the given configuration
pub async fn audit_site(seed_url: &str, config: &AuditConfig) -> Result<SiteAuditResult> {
    let fetcher = HttpFetcher::new(&config.crawl)?;
    SiteCrawler::new(config)?.crawl(&fetcher, seed_url).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{
        MSG_CANONICAL, MSG_DESCRIPTION, MSG_H1, MSG_LLM_POLICY, MSG_NO_PAGES, MSG_TITLE,
    };
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory site: unknown URLs return 404, listed failures return Err
    #[derive(Default)]
    struct MockFetcher {
        responses: HashMap<String, FetchResponse>,
        failures: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl MockFetcher {
        fn page(mut self, url: &str, status: u16, body: &str) -> Self {
            self.responses
                .insert(url.to_string(), FetchResponse::new(status, body));
            self
        }

        fn failing(mut self, url: &str) -> Self {
            self.failures.insert(url.to_string());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Fetcher for MockFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchResponse> {
            self.calls.lock().unwrap().push(url.to_string());
            if self.failures.contains(url) {
                return Err(AuditError::fetch(url, "connection refused"));
            }
            Ok(self
                .responses
                .get(url)
                .cloned()
                .unwrap_or_else(|| FetchResponse::new(404, "")))
        }
    }

    fn crawler(max_pages: usize) -> SiteCrawler {
        let mut config = AuditConfig::default();
        config.crawl.max_pages = max_pages;
        SiteCrawler::new(&config).unwrap()
    }

    fn linked_page(title: &str, links: &[&str]) -> String {
        let anchors: String = links
            .iter()
            .map(|l| format!("<a href=\"{}\">link</a>", l))
            .collect();
        format!(
            "<html><head><title>{}</title></head><body><p>Some text here.</p>{}</body></html>",
            title, anchors
        )
    }

    fn filler_words(n: usize) -> String {
        let sentence = "Rust makes crawling fast and safe for every team.";
        let mut words: Vec<&str> = Vec::new();
        while words.len() < n {
            words.extend(sentence.split(' '));
        }
        words.truncate(n);
        words.join(" ")
    }

    #[tokio::test]
    async fn test_invalid_seed_is_fatal() {
        let fetcher = MockFetcher::default();
        let err = crawler(1).crawl(&fetcher, "/just/a/path").await.unwrap_err();
        assert!(matches!(err, AuditError::InvalidUrl(_)));
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_short_title_single_page_scenario() {
        let html = format!(
            "<html><head><title>Short</title></head><body><p>{}</p></body></html>",
            filler_words(119)
        );
        let fetcher = MockFetcher::default().page("https://example.com/", 200, &html);

        let site = crawler(1).crawl(&fetcher, "example.com").await.unwrap();
        assert_eq!(site.pages.len(), 1);
        let page = &site.pages[0];
        // The title counts as visible text
        assert_eq!(page.text_stats.word_count, 120);

        let b = page.score_breakdown;
        assert_eq!(b.indexability, 15.0);
        assert_eq!(b.metadata, 4.0);
        assert_eq!(b.structure, 0.0);
        assert_eq!(b.structured_data, 0.0);
        assert_eq!(b.policy, 0.0);
        assert_eq!(b.sitemap, 0.0);

        let fit = Scorer::default().readability_fit(page.reading_ease);
        assert!((b.content_depth - 15.0 * 0.3 * fit).abs() <= 0.05 + 1e-9);

        for expected in [MSG_TITLE, MSG_DESCRIPTION, MSG_CANONICAL, MSG_H1, MSG_LLM_POLICY] {
            assert!(
                site.recommendations.iter().any(|r| r == expected),
                "missing recommendation {}",
                expected
            );
        }
        assert!(!site.llm_policy_found);
        assert!(site.robots_txt_body.is_none());
    }

    #[tokio::test]
    async fn test_robots_and_llm_policy_are_recorded() {
        let fetcher = MockFetcher::default()
            .page(
                "https://example.com/robots.txt",
                200,
                "User-agent: *\nDisallow: /private\nSitemap: https://example.com/sitemap.xml\n",
            )
            .page("https://example.com/llm.txt", 200, "Policy: allow")
            .page("https://example.com/private/page", 200, &linked_page("Private area page", &[]));

        let site = crawler(1)
            .crawl(&fetcher, "https://example.com/private/page")
            .await
            .unwrap();

        assert_eq!(site.sitemap_urls, vec!["https://example.com/sitemap.xml"]);
        assert!(site.llm_policy_found);
        assert_eq!(site.llm_policy_url.as_deref(), Some("https://example.com/llm.txt"));
        assert_eq!(site.llm_policy_body.as_deref(), Some("Policy: allow"));

        let page = &site.pages[0];
        assert!(page.blocked_by_robots);
        assert_eq!(page.score_breakdown.indexability, 0.0);
        assert_eq!(page.score_breakdown.policy, 10.0);
        assert_eq!(page.score_breakdown.sitemap, 5.0);

        let calls = fetcher.calls();
        assert_eq!(
            &calls[..3],
            &[
                "https://example.com/robots.txt".to_string(),
                "https://example.com/.well-known/llm.txt".to_string(),
                "https://example.com/llm.txt".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_llm_probe_stops_at_first_hit_and_survives_errors() {
        let fetcher = MockFetcher::default()
            .failing("https://example.com/robots.txt")
            .page("https://example.com/.well-known/llm.txt", 200, "Policy: allow")
            .page("https://example.com/", 200, &linked_page("Home page title", &[]));

        let site = crawler(1).crawl(&fetcher, "https://example.com").await.unwrap();
        assert_eq!(
            site.llm_policy_url.as_deref(),
            Some("https://example.com/.well-known/llm.txt")
        );
        assert!(!fetcher.calls().contains(&"https://example.com/llm.txt".to_string()));
        assert!(site.robots_txt_body.is_none());

        let fetcher = MockFetcher::default()
            .failing("https://example.com/.well-known/llm.txt")
            .page("https://example.com/llm.txt", 200, "Policy: allow");
        let site = crawler(1).crawl(&fetcher, "https://example.com").await.unwrap();
        assert_eq!(site.llm_policy_url.as_deref(), Some("https://example.com/llm.txt"));
    }

    #[tokio::test]
    async fn test_empty_policy_body_is_not_a_hit() {
        let fetcher = MockFetcher::default()
            .page("https://example.com/.well-known/llm.txt", 200, "")
            .page("https://example.com/llm.txt", 200, "");
        let site = crawler(1).crawl(&fetcher, "https://example.com").await.unwrap();
        assert!(!site.llm_policy_found);
        assert!(site.llm_policy_url.is_none());
    }

    #[tokio::test]
    async fn test_failed_seed_is_still_recorded() {
        let fetcher = MockFetcher::default().failing("https://example.com/");
        let site = crawler(3).crawl(&fetcher, "https://example.com/").await.unwrap();

        assert_eq!(site.pages.len(), 1);
        assert_eq!(site.pages[0].status_code, 0);
        assert_eq!(site.pages[0].text_stats.word_count, 0);
        assert!(!site.recommendations.iter().any(|r| r == MSG_NO_PAGES));
    }

    #[tokio::test]
    async fn test_breadth_first_same_origin_crawl() {
        let fetcher = MockFetcher::default()
            .page(
                "https://example.com/",
                200,
                &linked_page(
                    "Home page title",
                    &[
                        "/a",
                        "/b#frag",
                        "https://other.com/x",
                        "/logo.png",
                        "mailto:hi@example.com",
                        "/",
                        "/a",
                    ],
                ),
            )
            .page("https://example.com/a", 200, &linked_page("Page A title", &["/c", "/b"]))
            .page("https://example.com/b", 200, &linked_page("Page B title", &["/a"]))
            .page("https://example.com/c", 200, &linked_page("Page C title", &[]));

        let site = crawler(10).crawl(&fetcher, "https://example.com/").await.unwrap();
        let urls: Vec<&str> = site.pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/",
                "https://example.com/a",
                "https://example.com/b",
                "https://example.com/c",
            ]
        );

        let calls = fetcher.calls();
        assert!(!calls.iter().any(|c| c.contains("other.com") || c.ends_with(".png")));

        let prefixed = site
            .recommendations
            .iter()
            .filter(|r| r.starts_with("[https://example.com/a] "))
            .count();
        assert!(prefixed > 0);
    }

    #[tokio::test]
    async fn test_crawl_respects_page_budget() {
        let links: Vec<String> = (0..30).map(|i| format!("/p{}", i)).collect();
        let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
        let mut fetcher = MockFetcher::default().page(
            "https://example.com/",
            200,
            &linked_page("Home page title", &link_refs),
        );
        for link in &links {
            fetcher = fetcher.page(
                &format!("https://example.com{}", link),
                200,
                &linked_page("Child page title", &["/", "/p0", "/p1"]),
            );
        }

        let site = crawler(3).crawl(&fetcher, "https://example.com/").await.unwrap();
        assert_eq!(site.pages.len(), 3);

        let unique: HashSet<&str> = site.pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(unique.len(), 3);

        let page_fetches = fetcher
            .calls()
            .iter()
            .filter(|c| !c.ends_with(".txt"))
            .count();
        assert_eq!(page_fetches, 3);
    }

    #[tokio::test]
    async fn test_faq_schema_scenario() {
        let html = r#"<html lang="en"><head><title>Frequently asked questions</title>
            <script type="application/ld+json">{"@context":"https://schema.org","@type":"FAQPage","mainEntity":[]}</script>
            </head><body><h1>FAQ</h1><p>Answers to common questions.</p></body></html>"#;
        let fetcher = MockFetcher::default().page("https://example.com/faq", 200, html);

        let site = crawler(1).crawl(&fetcher, "https://example.com/faq").await.unwrap();
        let page = &site.pages[0];
        assert!(page.has_faq_schema);
        assert_eq!(page.json_ld_types, vec!["FAQPage"]);
        assert!(page.score_breakdown.structured_data >= 12.0);
    }

    #[tokio::test]
    async fn test_keywords_are_aggregated() {
        let fetcher = MockFetcher::default()
            .page(
                "https://example.com/",
                200,
                "<html><head><title>Crawler guide</title></head><body><h1>Crawler</h1>\
                 <p>crawler crawler frontier</p><a href=\"/two\">next</a></body></html>",
            )
            .page(
                "https://example.com/two",
                200,
                "<html><head><title>Frontier notes</title></head><body>\
                 <p>frontier crawler</p></body></html>",
            );

        let site = crawler(2).crawl(&fetcher, "https://example.com/").await.unwrap();
        assert_eq!(site.pages.len(), 2);
        assert!(site.keywords.len() <= 12);
        let crawler_kw = site.keywords.iter().find(|k| k.term == "crawler").unwrap();
        assert_eq!(crawler_kw.pages, 2);
        assert!(site.keywords.iter().all(|k| k.pages <= 2));
    }
}
