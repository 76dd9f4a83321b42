use std::{collections::HashMap, sync::LazyLock};

use regex::Regex;

use crate::document::markup::remove_tags;

pub const TOP_WORDS: usize = 5;
pub const SUMMARY_MIN_SENTENCES: usize = 5;
pub const GRAMMAR_SENTENCE_LIMIT: usize = 20;
pub const WORDS_PER_MINUTE: usize = 200;

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex compiles"));
static FREQUENCY_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z]{3,}").expect("frequency word regex compiles"));
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("word regex compiles"));
static SENTENCE_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence regex compiles"));

const STOP_WORDS: &[&str] = &[
    "about", "after", "all", "also", "and", "any", "are", "been", "but", "can", "could", "did",
    "does", "each", "for", "from", "had", "has", "have", "her", "him", "his", "how", "into", "its",
    "just", "more", "not", "now", "only", "other", "our", "out", "over", "she", "should", "some",
    "such", "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
    "was", "were", "what", "when", "which", "who", "will", "with", "would", "you", "your",
];

// Variants are listed in matching priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Frequency,
    Summarize,
    Statistics,
    Grammar,
    Fallback,
}

const INTENT_KEYWORDS: &[(Intent, &[&str])] = &[
    (Intent::Frequency, &["most used", "frequency", "common word"]),
    (Intent::Summarize, &["summarize", "summary", "overview"]),
    (Intent::Statistics, &["how many", "count", "stats", "long"]),
    (Intent::Grammar, &["grammar", "check"]),
];

pub fn classify(query: &str) -> Intent {
    let query = query.to_lowercase();
    INTENT_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| query.contains(k)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::Fallback)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub display: String,
    pub lower: String,
}

pub fn normalize(text: &str) -> NormalizedText {
    let stripped = remove_tags(text);
    let display = WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string();
    let lower = display.to_lowercase();
    NormalizedText { display, lower }
}

pub fn word_frequency(lower: &str, limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for word in FREQUENCY_WORD_RE.find_iter(lower).map(|m| m.as_str()) {
        if STOP_WORDS.contains(&word) {
            continue;
        }
        let count = counts.entry(word).or_insert(0);
        if *count == 0 {
            order.push(word);
        }
        *count += 1;
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|word| (word.to_string(), counts[word]))
        .collect();
    // `sort_by` is stable, which is what keeps ties in first-seen order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

pub fn sentences(text: &str) -> Vec<&str> {
    SENTENCE_END_RE
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary<'a> {
    Verbatim(&'a str),
    Extract {
        first: &'a str,
        middle: &'a str,
        last: &'a str,
    },
}

pub fn summarize(text: &str) -> Summary<'_> {
    let sentences = sentences(text);
    if sentences.len() < SUMMARY_MIN_SENTENCES {
        return Summary::Verbatim(text);
    }
    Summary::Extract {
        first: sentences[0],
        middle: sentences[sentences.len() / 2],
        last: sentences[sentences.len() - 1],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStats {
    pub words: usize,
    pub characters: usize,
    pub sentences: usize,
    pub reading_minutes: usize,
}

pub fn statistics(text: &str) -> TextStats {
    let words = WORD_RE.find_iter(text).count();
    TextStats {
        words,
        characters: text.chars().count(),
        sentences: sentences(text).len(),
        reading_minutes: words.div_ceil(WORDS_PER_MINUTE),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarReport {
    pub checked: usize,
    pub flagged: Vec<String>,
}

impl GrammarReport {
    pub fn is_clean(&self) -> bool {
        self.flagged.is_empty()
    }
}

pub fn check_capitalization(text: &str) -> GrammarReport {
    let checked: Vec<&str> = sentences(text)
        .into_iter()
        .take(GRAMMAR_SENTENCE_LIMIT)
        .collect();
    let flagged = checked
        .iter()
        .filter(|sentence| {
            sentence
                .chars()
                .next()
                .is_some_and(|c| !c.is_uppercase())
        })
        .map(|sentence| sentence.to_string())
        .collect();
    GrammarReport {
        checked: checked.len(),
        flagged,
    }
}
