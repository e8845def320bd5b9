use crate::config::CrawlConfig;
use crate::utils::is_same_origin;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use url::Url;

/// Directives read from robots.txt.
///
/// Blocking is a plain path-prefix test against `Disallow` values; `Allow`
/// lines are recorded but never override a disallow, and `*`/`$` have no
/// special meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RobotsRules {
    pub sitemaps: Vec<String>,
    pub disallow: Vec<String>,
    pub allow: Vec<String>,
}

impl RobotsRules {
    /// Parse `Sitemap:`, `Disallow:` and `Allow:` lines; comments and blanks are skipped
    pub fn parse(body: &str) -> Self {
        let mut rules = Self::default();

        for line in body.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim().to_string();
            match key.trim().to_lowercase().as_str() {
                "sitemap" => {
                    if !rules.sitemaps.contains(&value) {
                        rules.sitemaps.push(value);
                    }
                }
                "disallow" => rules.disallow.push(value),
                "allow" => rules.allow.push(value),
                _ => {}
            }
        }

        rules
    }

    /// True iff the URL path starts with any non-empty `Disallow` value,
    /// compared in the percent-encoded form `Url::path` returns
    pub fn is_blocked(&self, url: &Url) -> bool {
        let path = url.path();
        self.disallow
            .iter()
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
            .any(|d| path.starts_with(encoded_path(url, d).as_ref()))
    }
}

/// Percent-encode a `Disallow` path the way the `url` crate encodes paths.
/// Values that are already plain ASCII, or that carry a query or fragment,
/// are used as written.
fn encoded_path<'a>(url: &Url, value: &'a str) -> Cow<'a, str> {
    let needs_encoding = value
        .bytes()
        .any(|b| !b.is_ascii_graphic() || b"\"<>`{}".contains(&b));
    if !needs_encoding
        || !value.starts_with('/')
        || value.starts_with("//")
        || value.contains(['?', '#'])
    {
        return Cow::Borrowed(value);
    }
    match url.join(value) {
        Ok(joined) => Cow::Owned(joined.path().to_string()),
        Err(_) => Cow::Borrowed(value),
    }
}

/// Decides which discovered links join the crawl frontier
#[derive(Debug)]
pub struct UrlFilter {
    root_url: Url,
    non_html: Option<Regex>,
}

impl UrlFilter {
    /// Build a filter scoped to the origin of `root_url`
    pub fn new(root_url: Url, config: &CrawlConfig) -> Result<Self, regex::Error> {
        let alternatives = config
            .non_html_extensions
            .iter()
            .map(|ext| regex::escape(ext.trim_start_matches('.')))
            .filter(|ext| !ext.is_empty())
            .collect::<Vec<_>>();

        let non_html = if alternatives.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(r"(?i)\.(?:{})$", alternatives.join("|")))?)
        };

        Ok(Self { root_url, non_html })
    }

    /// Same origin as the root, http(s) scheme, and not a known non-HTML resource
    pub fn should_crawl(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }

        if !is_same_origin(&self.root_url, url) {
            return false;
        }

        !self.is_non_html(url)
    }

    /// Check the URL path against the non-HTML extension list
    pub fn is_non_html(&self, url: &Url) -> bool {
        self.non_html
            .as_ref()
            .is_some_and(|re| re.is_match(url.path()))
    }

    /// Create a normalized version of the URL (fragment removed)
    pub fn normalize_url(&self, url: &Url) -> Url {
        let mut normalized = url.clone();
        normalized.set_fragment(None);
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> UrlFilter {
        let root = Url::parse("https://example.com/").unwrap();
        UrlFilter::new(root, &CrawlConfig::default()).unwrap()
    }

    #[test]
    fn test_parse_robots_directives() {
        let body = "\
# comment line
User-agent: *
Disallow: /private
disallow: /tmp/
ALLOW: /private/public
Sitemap: https://example.com/sitemap.xml
sitemap: https://example.com/sitemap.xml

Sitemap: https://example.com/news.xml
";
        let rules = RobotsRules::parse(body);
        assert_eq!(rules.disallow, vec!["/private", "/tmp/"]);
        assert_eq!(rules.allow, vec!["/private/public"]);
        assert_eq!(
            rules.sitemaps,
            vec![
                "https://example.com/sitemap.xml",
                "https://example.com/news.xml"
            ]
        );
    }

    #[test]
    fn test_prefix_blocking() {
        let rules = RobotsRules::parse("Disallow: /private\nDisallow:\nAllow: /private/ok");
        let blocked = Url::parse("https://example.com/private/ok").unwrap();
        let open = Url::parse("https://example.com/public").unwrap();
        assert!(rules.is_blocked(&blocked), "Allow never overrides a prefix match");
        assert!(!rules.is_blocked(&open));
    }

    #[test]
    fn test_non_ascii_disallow_matches_encoded_path() {
        let rules = RobotsRules::parse("Disallow: /café\nDisallow: /my docs/");
        let cafe = Url::parse("https://example.com/café/menu").unwrap();
        let spaced = Url::parse("https://example.com/my%20docs/readme").unwrap();
        let other = Url::parse("https://example.com/cafe").unwrap();
        assert_eq!(cafe.path(), "/caf%C3%A9/menu");
        assert!(rules.is_blocked(&cafe));
        assert!(rules.is_blocked(&spaced));
        assert!(!rules.is_blocked(&other));
    }

    #[test]
    fn test_empty_disallow_blocks_nothing() {
        let rules = RobotsRules::parse("User-agent: *\nDisallow:");
        let url = Url::parse("https://example.com/anything").unwrap();
        assert!(!rules.is_blocked(&url));
    }

    #[test]
    fn test_filter_rejects_other_origins_and_schemes() {
        let filter = filter();
        assert!(filter.should_crawl(&Url::parse("https://example.com/about").unwrap()));
        assert!(!filter.should_crawl(&Url::parse("http://example.com/about").unwrap()));
        assert!(!filter.should_crawl(&Url::parse("https://other.com/about").unwrap()));
        assert!(!filter.should_crawl(&Url::parse("ftp://example.com/file").unwrap()));
    }

    #[test]
    fn test_filter_rejects_non_html_extensions() {
        let filter = filter();
        for path in ["/logo.PNG", "/app.js", "/style.css", "/paper.pdf", "/clip.mp4"] {
            let url = Url::parse(&format!("https://example.com{}", path)).unwrap();
            assert!(!filter.should_crawl(&url), "{} should be rejected", path);
        }
        let page = Url::parse("https://example.com/docs/page.html?v=1.js").unwrap();
        assert!(filter.should_crawl(&page), "only the path is checked");
    }

    #[test]
    fn test_normalize_strips_fragment() {
        let url = Url::parse("https://example.com/a#b").unwrap();
        assert_eq!(filter().normalize_url(&url).as_str(), "https://example.com/a");
    }
}
