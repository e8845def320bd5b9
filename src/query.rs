//! How well a page lines up with a search-style query.

use crate::results::PageRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

static QUERY_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z0-9']+").expect("valid query token regex"));

const MIN_TERM_LEN: usize = 3;

const QUERY_STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "how", "what", "why", "when", "where", "who", "which", "can",
    "does", "are", "you", "your", "that", "this", "from", "into", "about", "should", "was", "were",
    "has", "have", "its", "our",
];

const QUESTION_WORDS: &[&str] = &[
    "how", "what", "why", "when", "where", "who", "which", "can", "does", "do", "is", "are",
    "should",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAlignment {
    pub query: String,
    pub terms_analyzed: Vec<String>,
    pub present_terms: Vec<String>,
    pub missing_terms: Vec<String>,
    pub heading_terms_missing: Vec<String>,
    pub question_intent: bool,
    pub phrase_present: bool,
    pub recommendations: Vec<String>,
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    QUERY_TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
}

fn token_set<'a>(texts: impl IntoIterator<Item = &'a str>) -> HashSet<String> {
    texts
        .into_iter()
        .flat_map(|t| tokens(&t.to_lowercase()).collect::<Vec<_>>())
        .collect()
}

/// Significant query terms in order, deduplicated
pub fn query_terms(query: &str) -> Vec<String> {
    let lower = query.to_lowercase();
    let mut seen = HashSet::new();
    tokens(&lower)
        .filter(|t| t.chars().count() >= MIN_TERM_LEN && !QUERY_STOP_WORDS.contains(&t.as_str()))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

fn is_question(query: &str) -> bool {
    let trimmed = query.trim();
    if trimmed.ends_with('?') {
        return true;
    }
    trimmed
        .split_whitespace()
        .next()
        .map(|w| w.to_lowercase())
        .is_some_and(|w| QUESTION_WORDS.contains(&w.as_str()))
}

/// Compare a query with a page's text, title, description and headings
pub fn analyze_query_alignment(query: &str, body_text: &str, page: &PageRecord) -> QueryAlignment {
    let terms = query_terms(query);

    let page_tokens = token_set(
        [body_text]
            .into_iter()
            .chain(page.title.as_deref())
            .chain(page.description.as_deref())
            .chain(page.headings.all().map(String::as_str)),
    );
    let heading_tokens = token_set(page.headings.all().map(String::as_str));

    let (present_terms, missing_terms): (Vec<String>, Vec<String>) = terms
        .iter()
        .cloned()
        .partition(|t| page_tokens.contains(t));
    let heading_terms_missing: Vec<String> = terms
        .iter()
        .filter(|t| !heading_tokens.contains(*t))
        .cloned()
        .collect();

    let question_intent = is_question(query);
    let phrase = query
        .trim()
        .trim_end_matches('?')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let body_normalized = body_text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let phrase_present = !phrase.is_empty() && body_normalized.contains(&phrase);

    let mut recommendations = Vec::new();
    for term in &missing_terms {
        recommendations.push(format!("Mention '{}' in the page copy to match the query.", term));
    }
    for term in &heading_terms_missing {
        recommendations.push(format!("Work '{}' into an H1/H2/H3 heading.", term));
    }
    if question_intent && !page.has_faq_schema {
        recommendations.push(
            "Answer the question directly in a Q&A block and mark it up with FAQPage JSON-LD."
                .to_string(),
        );
    }
    if !phrase_present && terms.len() >= 2 {
        recommendations.push(format!("Use the exact phrase \"{}\" at least once.", phrase));
    }

    QueryAlignment {
        query: query.to_string(),
        terms_analyzed: terms,
        present_terms,
        missing_terms,
        heading_terms_missing,
        question_intent,
        phrase_present,
        recommendations,
    }
}
