use crate::results::SiteAuditResult;
use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT_CONTACT: &str = "webmaster@domain";
const DEFAULT_LICENSE_URL: &str = "https://creativecommons.org/licenses/by/4.0/";

/// Inputs for an `llm.txt` policy draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDraft {
    pub base_url: String,
    #[serde(default)]
    pub sitemaps: Vec<String>,
    #[serde(default = "default_contact")]
    pub contact: String,
    #[serde(default = "default_license_url")]
    pub license_url: String,
    #[serde(default)]
    pub preferred_sources: Vec<String>,
    #[serde(default)]
    pub api_endpoints: Vec<String>,
}

fn default_contact() -> String {
    DEFAULT_CONTACT.to_string()
}

fn default_license_url() -> String {
    DEFAULT_LICENSE_URL.to_string()
}

impl PolicyDraft {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            sitemaps: Vec::new(),
            contact: default_contact(),
            license_url: default_license_url(),
            preferred_sources: Vec::new(),
            api_endpoints: Vec::new(),
        }
    }

    /// Seed a draft with the audited base URL and discovered sitemaps
    pub fn from_audit(site: &SiteAuditResult) -> Self {
        Self {
            sitemaps: site.sitemap_urls.clone(),
            ..Self::new(site.base_url.clone())
        }
    }

    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = contact.into();
        self
    }

    pub fn with_license_url(mut self, license_url: impl Into<String>) -> Self {
        self.license_url = license_url.into();
        self
    }

    pub fn with_preferred_sources(mut self, sources: Vec<String>) -> Self {
        self.preferred_sources = sources;
        self
    }

    pub fn with_api_endpoints(mut self, endpoints: Vec<String>) -> Self {
        self.api_endpoints = endpoints;
        self
    }

    /// Authority (`host[:port]`) of the base URL, empty if it does not parse
    fn host(&self) -> String {
        Url::parse(&self.base_url)
            .ok()
            .and_then(|url| {
                url.host_str().map(|host| match url.port() {
                    Some(port) => format!("{}:{}", host, port),
                    None => host.to_string(),
                })
            })
            .unwrap_or_default()
    }

    /// Render the `llm.txt` document
    pub fn render(&self) -> String {
        let sitemaps = if self.sitemaps.is_empty() {
            "# (add sitemap URLs here)".to_string()
        } else {
            self.sitemaps
                .iter()
                .map(|s| format!("Sitemap: {}", s))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let preferred = or_placeholder(&self.preferred_sources, "# add important URLs");
        let apis = or_placeholder(&self.api_endpoints, "# add API endpoints if relevant");

        format!(
            "# llm.txt — Guidance for LLM crawlers and trainers
# Learn more: https://www.llmtext.org/ (example placeholder link)

User-agent: *
# Options: allow, disallow, no-train, no-derive, cite-required
Policy: allow

# Crawl policy
Crawl-Delay: 2

# Sitemaps
{sitemaps}

# Canonical host (optional)
Host: {host}

# Content usage and attribution
License: {license}
Attribution: required
Attribution-Format: link
Contact: {contact}

# Preferred citation pages (optional)
Preferred-Sources: {preferred}

# API endpoints (optional)
APIs: {apis}

# Notes
Note: This file expresses publisher preferences for LLMs. It complements robots.txt.
",
            host = self.host(),
            license = self.license_url,
            contact = self.contact,
        )
    }
}

fn or_placeholder(items: &[String], placeholder: &str) -> String {
    if items.is_empty() {
        placeholder.to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_with_defaults() {
        let text = PolicyDraft::new("https://example.com:8080/docs").render();
        assert!(text.contains("Host: example.com:8080\n"));
        assert!(text.contains("# (add sitemap URLs here)"));
        assert!(text.contains("Contact: webmaster@domain\n"));
        assert!(text.contains("License: https://creativecommons.org/licenses/by/4.0/\n"));
        assert!(text.contains("Preferred-Sources: # add important URLs\n"));
        assert!(text.contains("APIs: # add API endpoints if relevant\n"));
        assert!(text.starts_with("# llm.txt"));
    }

    #[test]
    fn test_render_from_audit() {
        let mut site = SiteAuditResult::new("https://example.com/".to_string());
        site.sitemap_urls = vec![
            "https://example.com/sitemap.xml".to_string(),
            "https://example.com/news.xml".to_string(),
        ];

        let text = PolicyDraft::from_audit(&site)
            .with_contact("ops@example.com")
            .with_preferred_sources(vec![
                "https://example.com/docs".to_string(),
                "https://example.com/faq".to_string(),
            ])
            .with_api_endpoints(vec!["https://api.example.com".to_string()])
            .render();

        assert!(text.contains(
            "Sitemap: https://example.com/sitemap.xml\nSitemap: https://example.com/news.xml\n"
        ));
        assert!(text.contains("Host: example.com\n"));
        assert!(text.contains("Contact: ops@example.com\n"));
        assert!(text.contains(
            "Preferred-Sources: https://example.com/docs, https://example.com/faq\n"
        ));
        assert!(text.contains("APIs: https://api.example.com\n"));
    }
}
