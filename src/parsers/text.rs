use crate::results::TextStats;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<script[\s\S]*?</script>").expect("valid script regex"));
static STYLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<style[\s\S]*?</style>").expect("valid style regex"));
static COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!--[\s\S]*?-->").expect("valid comment regex"));
static BLOCK_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)</?(?:p|div|section|article|li|br|h[1-6]|tr|td|th|ul|ol|nav|footer|header)[^>]*>",
    )
    .expect("valid block tag regex")
});
static ANY_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z']+").expect("valid word regex"));
static SENTENCE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+\s+").expect("valid sentence regex"));

/// Approximate the rendered text of an HTML document.
///
/// Script/style blocks and comments are removed, block-level tags become
/// line breaks, any other tag is stripped and whitespace runs collapse to a
/// single space. Entities are left as-is.
pub fn extract_visible_text(html: &str) -> String {
    let text = SCRIPT_RE.replace_all(html, " ");
    let text = STYLE_RE.replace_all(&text, " ");
    let text = COMMENT_RE.replace_all(&text, " ");
    let text = BLOCK_TAG_RE.replace_all(&text, "\n");
    let text = ANY_TAG_RE.replace_all(&text, " ");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Words in order of appearance: maximal runs of ASCII letters and apostrophes
pub fn words(text: &str) -> Vec<&str> {
    WORD_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Count words, distinct words, sentences and syllables in plain text
pub fn word_stats(text: &str) -> TextStats {
    let words = words(text);
    let word_count = words.len();
    let unique_word_count = words
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<HashSet<_>>()
        .len();

    let sentence_count = if text.trim().is_empty() {
        0
    } else {
        SENTENCE_BREAK_RE
            .split(text)
            .filter(|s| !s.trim().is_empty())
            .count()
            .max(1)
    };

    let syllable_count = words.iter().map(|w| estimate_syllables(w)).sum();
    let avg_sentence_length = if sentence_count == 0 {
        0.0
    } else {
        word_count as f64 / sentence_count as f64
    };

    TextStats {
        word_count,
        unique_word_count,
        sentence_count,
        syllable_count,
        avg_sentence_length,
    }
}

/// Heuristic syllable count: vowel groups (`y` included), minus a silent
/// trailing `e`, never below one.
pub fn estimate_syllables(word: &str) -> usize {
    let word = word.to_lowercase();
    let mut count = 0;
    let mut prev_vowel = false;

    for ch in word.chars() {
        let is_vowel = matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if is_vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = is_vowel;
    }

    if word.ends_with('e') && count > 1 {
        count -= 1;
    }

    count.max(1)
}

/// Flesch reading ease. Unclamped; 0.0 when there are no words or sentences.
pub fn flesch_reading_ease(words: usize, sentences: usize, syllables: usize) -> f64 {
    if words == 0 || sentences == 0 {
        return 0.0;
    }
    let words = words as f64;
    206.835 - 1.015 * (words / sentences as f64) - 84.6 * (syllables as f64 / words)
}
