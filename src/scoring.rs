use crate::config::{CategoryWeights, ScoringConfig};
use crate::results::{PageRecord, ScoreBreakdown, SiteAuditResult};
use crate::utils::{clamp, round1};
use std::collections::HashSet;

pub const MSG_BLOCKED: &str = "Allow the page in robots.txt (avoid disallowing this path).";
pub const MSG_META_ROBOTS: &str = "Remove 'noindex'/'nofollow' meta robots for LLM discoverability.";
pub const MSG_TITLE: &str = "Add a concise, descriptive <title> (10–65 chars).";
pub const MSG_DESCRIPTION: &str = "Add a meta description (50–160 chars) summarizing the page.";
pub const MSG_CANONICAL: &str = "Add a canonical <link> to prevent duplication.";
pub const MSG_LANG: &str = "Set the <html lang=\"...\"> attribute for language clarity.";
pub const MSG_H1: &str = "Include a single, clear H1 headline.";
pub const MSG_H2: &str = "Structure content with multiple H2 sections.";
pub const MSG_H3: &str = "Use H3 subsections to organize details.";
pub const MSG_SEMANTIC: &str = "Use semantic HTML (<article>, <section>, <main>, etc.).";
pub const MSG_JSON_LD: &str = "Add JSON-LD structured data (WebSite/Organization/Article/FAQ).";
pub const MSG_FAQ: &str = "Add FAQPage JSON-LD for common questions and answers.";
pub const MSG_DEPTH: &str = "Increase content depth to 400–800+ words of unique text.";
pub const MSG_SITEMAP: &str = "Expose a Sitemap in robots.txt for better discovery.";
pub const MSG_LLM_POLICY: &str = "Publish /.well-known/llm.txt with LLM crawl/citation policy.";
pub const MSG_NO_PAGES: &str = "Failed to fetch any pages.";

const TITLE_RANGE: (usize, usize) = (10, 65);
const DESCRIPTION_RANGE: (usize, usize) = (50, 160);
const MIN_DEPTH_WORDS: usize = 400;

fn text_len(text: Option<&str>) -> Option<usize> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.chars().count())
}

fn in_range(len: Option<usize>, (lo, hi): (usize, usize)) -> bool {
    len.is_some_and(|n| (lo..=hi).contains(&n))
}

/// Weighted multi-factor discoverability scoring
#[derive(Debug, Clone)]
pub struct Scorer {
    weights: CategoryWeights,
    readability_target: f64,
    target_schema_types: HashSet<String>,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}

impl Scorer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            weights: config.weights,
            readability_target: config.readability_target,
            target_schema_types: config.target_schema_types.iter().cloned().collect(),
        }
    }

    /// Normalized [0, 1] sub-score per category, before weighting
    pub fn sub_scores(&self, page: &PageRecord, policy_found: bool, has_sitemap: bool) -> ScoreBreakdown {
        ScoreBreakdown {
            indexability: self.indexability(page),
            metadata: self.metadata(page),
            structure: self.structure(page),
            structured_data: self.structured_data(page),
            content_depth: self.content_depth(page),
            policy: if policy_found { 1.0 } else { 0.0 },
            sitemap: if has_sitemap { 1.0 } else { 0.0 },
        }
    }

    /// Weighted, unrounded contribution per category
    pub fn contributions(&self, page: &PageRecord, policy_found: bool, has_sitemap: bool) -> ScoreBreakdown {
        let s = self.sub_scores(page, policy_found, has_sitemap);
        let w = &self.weights;
        ScoreBreakdown {
            indexability: w.indexability * s.indexability,
            metadata: w.metadata * s.metadata,
            structure: w.structure * s.structure,
            structured_data: w.structured_data * s.structured_data,
            content_depth: w.content_depth * s.content_depth,
            policy: w.policy * s.policy,
            sitemap: w.sitemap * s.sitemap,
        }
    }

    fn indexability(&self, page: &PageRecord) -> f64 {
        let mut score = if page.blocked_by_robots { 0.0 } else { 1.0 };
        if page.has_noindex_or_nofollow() {
            score *= 0.3;
        }
        score
    }

    fn metadata(&self, page: &PageRecord) -> f64 {
        let mut score = 0.0;

        let title_len = text_len(page.title.as_deref());
        if in_range(title_len, TITLE_RANGE) {
            score += 0.35;
        } else if title_len.is_some() {
            score += 0.2;
        }

        let desc_len = text_len(page.description.as_deref());
        if in_range(desc_len, DESCRIPTION_RANGE) {
            score += 0.25;
        } else if desc_len.is_some() {
            score += 0.15;
        }

        if page.og("og:title").is_some() {
            score += 0.15;
        }
        if page.og("og:description").is_some() {
            score += 0.1;
        }
        if page.canonical_url.is_some() {
            score += 0.1;
        }
        if page.has_lang_attribute {
            score += 0.05;
        }

        clamp(score, 0.0, 1.0)
    }

    fn structure(&self, page: &PageRecord) -> f64 {
        let mut score = 0.0;
        if !page.headings.h1.is_empty() {
            score += 0.45;
        }
        if page.headings.h2.len() >= 2 {
            score += 0.25;
        }
        if page.headings.h3.len() >= 2 {
            score += 0.15;
        }
        if !page.semantic_tags_present.is_empty() {
            score += 0.15;
        }
        clamp(score, 0.0, 1.0)
    }

    fn structured_data(&self, page: &PageRecord) -> f64 {
        let mut score = 0.0;
        if !page.json_ld_types.is_empty() {
            score += 0.4;
            if page
                .json_ld_types
                .iter()
                .any(|t| self.target_schema_types.contains(t))
            {
                score += 0.4;
            }
        }
        clamp(score, 0.0, 1.0)
    }

    fn content_depth(&self, page: &PageRecord) -> f64 {
        let words = page.text_stats.word_count;
        let depth = if words >= 800 {
            0.5
        } else if words >= 400 {
            0.35
        } else if words >= 200 {
            0.2
        } else {
            0.0
        };
        clamp(depth + 0.3 * self.readability_fit(page.reading_ease), 0.0, 1.0)
    }

    /// 1.0 at the target reading ease, falling linearly to 0 one target-width away
    pub fn readability_fit(&self, reading_ease: f64) -> f64 {
        let target = self.readability_target;
        if target <= 0.0 {
            return 0.0;
        }
        clamp(1.0 - (reading_ease - target).abs() / target, 0.0, 1.0)
    }

    /// Score every page and the site as a whole.
    ///
    /// Page scores and breakdowns are rounded to one decimal; the site values
    /// are means of the unrounded page values.
    pub fn score_site(&self, site: &mut SiteAuditResult) {
        if site.pages.is_empty() {
            site.score = 0.0;
            site.breakdown = ScoreBreakdown::default();
            return;
        }

        let policy_found = site.llm_policy_found;
        let has_sitemap = !site.sitemap_urls.is_empty();
        let mut totals = ScoreBreakdown::default();

        for page in site.pages.iter_mut() {
            let components = self.contributions(page, policy_found, has_sitemap);
            page.score = round1(components.total());
            page.score_breakdown = components.map(round1);
            totals = totals.add(&components);
        }

        let count = site.pages.len() as f64;
        site.score = round1(totals.total() / count);
        site.breakdown = totals.map(|v| round1(v / count));

        ::log::debug!("Scored {} pages, site score {}", site.pages.len(), site.score);
    }
}

/// Fixed-text advisories for one page; conditions are independent
pub fn page_recommendations(page: &PageRecord) -> Vec<String> {
    let mut recs = Vec::new();

    if page.blocked_by_robots {
        recs.push(MSG_BLOCKED);
    }
    if page.has_noindex_or_nofollow() {
        recs.push(MSG_META_ROBOTS);
    }
    if !in_range(text_len(page.title.as_deref()), TITLE_RANGE) {
        recs.push(MSG_TITLE);
    }
    if !in_range(text_len(page.description.as_deref()), DESCRIPTION_RANGE) {
        recs.push(MSG_DESCRIPTION);
    }
    if page.canonical_url.is_none() {
        recs.push(MSG_CANONICAL);
    }
    if !page.has_lang_attribute {
        recs.push(MSG_LANG);
    }
    if page.headings.h1.is_empty() {
        recs.push(MSG_H1);
    }
    if page.headings.h2.len() < 2 {
        recs.push(MSG_H2);
    }
    if page.headings.h3.len() < 2 {
        recs.push(MSG_H3);
    }
    if page.semantic_tags_present.is_empty() {
        recs.push(MSG_SEMANTIC);
    }
    if page.json_ld_types.is_empty() {
        recs.push(MSG_JSON_LD);
    } else if !page.has_faq_schema {
        recs.push(MSG_FAQ);
    }
    if page.text_stats.word_count < MIN_DEPTH_WORDS {
        recs.push(MSG_DEPTH);
    }

    recs.into_iter().map(str::to_string).collect()
}

/// Fill per-page recommendations and the combined, deduplicated site list
pub fn derive_recommendations(site: &mut SiteAuditResult) {
    if site.pages.is_empty() {
        site.recommendations = vec![MSG_NO_PAGES.to_string()];
        return;
    }

    let multi_page = site.pages.len() > 1;
    let mut seen = HashSet::new();
    let mut combined = Vec::new();

    for page in site.pages.iter_mut() {
        page.recommendations = page_recommendations(page);
        for rec in &page.recommendations {
            let message = if multi_page {
                format!("[{}] {}", page.url, rec)
            } else {
                rec.clone()
            };
            if seen.insert(message.clone()) {
                combined.push(message);
            }
        }
    }

    if site.sitemap_urls.is_empty() && !seen.contains(MSG_SITEMAP) {
        combined.push(MSG_SITEMAP.to_string());
    }
    if !site.llm_policy_found && !seen.contains(MSG_LLM_POLICY) {
        combined.push(MSG_LLM_POLICY.to_string());
    }

    site.recommendations = combined;
}
