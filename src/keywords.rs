use crate::config::KeywordConfig;
use crate::results::{Headings, KeywordInsight, KeywordSummary, PageRecord};
use crate::utils::{clamp, round1};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z']+").expect("valid token regex"));

const FREQUENCY_WEIGHT: f64 = 60.0;
const TITLE_BONUS: f64 = 25.0;
const H1_BONUS: f64 = 15.0;
const H2_BONUS: f64 = 10.0;
const H3_BONUS: f64 = 5.0;
const DESCRIPTION_BONUS: f64 = 5.0;

/// Frequency-and-placement keyword salience
#[derive(Debug, Clone)]
pub struct KeywordEngine {
    stop_words: HashSet<String>,
    min_token_len: usize,
    max_per_page: usize,
    max_site: usize,
}

impl Default for KeywordEngine {
    fn default() -> Self {
        Self::new(&KeywordConfig::default())
    }
}

impl KeywordEngine {
    pub fn new(config: &KeywordConfig) -> Self {
        Self {
            stop_words: config.stop_words.iter().map(|w| w.to_lowercase()).collect(),
            min_token_len: config.min_token_len,
            max_per_page: config.max_per_page,
            max_site: config.max_site,
        }
    }

    /// Lowercased letter/apostrophe runs, minus short tokens and stop words
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        TOKEN_RE
            .find_iter(&lower)
            .map(|m| m.as_str())
            .filter(|t| t.chars().count() >= self.min_token_len && !self.stop_words.contains(*t))
            .map(str::to_string)
            .collect()
    }

    fn token_set<'a>(&self, texts: impl IntoIterator<Item = &'a String>) -> HashSet<String> {
        texts
            .into_iter()
            .flat_map(|t| self.tokenize(t))
            .collect()
    }

    fn optional_token_set(&self, text: Option<&str>) -> HashSet<String> {
        text.map(|t| self.tokenize(t).into_iter().collect())
            .unwrap_or_default()
    }

    /// Rank the terms of one page using the configured per-page limit
    pub fn extract_keywords(
        &self,
        body_text: &str,
        title: Option<&str>,
        headings: &Headings,
        description: Option<&str>,
    ) -> Vec<KeywordInsight> {
        self.extract_keywords_with_limit(body_text, title, headings, description, self.max_per_page)
    }

    /// Rank the terms of one page, sorted by (score desc, frequency desc)
    pub fn extract_keywords_with_limit(
        &self,
        body_text: &str,
        title: Option<&str>,
        headings: &Headings,
        description: Option<&str>,
        max: usize,
    ) -> Vec<KeywordInsight> {
        let tokens = self.tokenize(body_text);
        if tokens.is_empty() {
            return Vec::new();
        }

        // First-seen order breaks ties.
        let mut order: Vec<String> = Vec::new();
        let mut frequencies: HashMap<String, usize> = HashMap::new();
        for token in tokens {
            let count = frequencies.entry(token.clone()).or_insert(0);
            if *count == 0 {
                order.push(token);
            }
            *count += 1;
        }
        let max_freq = frequencies.values().copied().max().unwrap_or(0);
        if max_freq == 0 {
            return Vec::new();
        }

        let title_tokens = self.optional_token_set(title);
        let desc_tokens = self.optional_token_set(description);
        let h1_tokens = self.token_set(&headings.h1);
        let h2_tokens = self.token_set(&headings.h2);
        let h3_tokens = self.token_set(&headings.h3);

        let mut insights: Vec<KeywordInsight> = order
            .into_iter()
            .map(|term| {
                let frequency = frequencies[&term];
                let in_title = title_tokens.contains(&term);
                let in_h1 = h1_tokens.contains(&term);
                let in_h2 = h2_tokens.contains(&term);
                let in_h3 = h3_tokens.contains(&term);
                let in_description = desc_tokens.contains(&term);

                let mut score = frequency as f64 / max_freq as f64 * FREQUENCY_WEIGHT;
                if in_title {
                    score += TITLE_BONUS;
                }
                if in_h1 {
                    score += H1_BONUS;
                }
                if in_h2 {
                    score += H2_BONUS;
                }
                if in_h3 {
                    score += H3_BONUS;
                }
                if in_description {
                    score += DESCRIPTION_BONUS;
                }

                KeywordInsight {
                    term,
                    score: round1(clamp(score, 0.0, 100.0)),
                    frequency,
                    in_title,
                    in_headings: in_h1 || in_h2 || in_h3,
                    in_description,
                }
            })
            .collect();

        insights.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| b.frequency.cmp(&a.frequency))
        });
        insights.truncate(max);
        insights
    }

    /// Site-wide ranking using the configured limit
    pub fn aggregate_keywords(&self, pages: &[PageRecord]) -> Vec<KeywordSummary> {
        aggregate_keywords(pages, self.max_site)
    }
}

/// Average each term's score over the pages that list it, sorted by
/// (average desc, page count desc) and truncated to `max`.
pub fn aggregate_keywords(pages: &[PageRecord], max: usize) -> Vec<KeywordSummary> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<f64>> = HashMap::new();

    for page in pages {
        for kw in &page.keywords {
            let scores = buckets.entry(kw.term.clone()).or_default();
            if scores.is_empty() {
                order.push(kw.term.clone());
            }
            scores.push(kw.score);
        }
    }

    let mut summaries: Vec<KeywordSummary> = order
        .into_iter()
        .filter_map(|term| {
            let scores = buckets.get(&term)?;
            let avg = scores.iter().sum::<f64>() / scores.len() as f64;
            Some(KeywordSummary {
                term,
                score: round1(avg),
                pages: scores.len(),
            })
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.pages.cmp(&a.pages))
    });
    summaries.truncate(max);
    summaries
}
