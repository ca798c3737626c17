//! Keyword inventory of a job description, and term lookup in resume text.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// How many job-description terms the analysis and the per-bullet diff consider.
pub const KEYWORD_LIMIT: usize = 25;

static TERM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z][A-Za-z0-9+#]*(?:[./-][A-Za-z0-9+#]+)*").expect("term pattern is valid")
});

/// Filler that carries no signal about the role.
const STOPWORDS: &[&str] = &[
    "a", "about", "across", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "both", "but", "by", "can", "do", "each", "etc", "for", "from", "has", "have", "help",
    "how", "if", "in", "into", "is", "it", "its", "join", "just", "like", "looking", "make",
    "may", "more", "most", "must", "new", "not", "of", "on", "one", "or", "other", "our",
    "out", "over", "own", "per", "plus", "so", "such", "than", "that", "the", "their", "them",
    "there", "these", "they", "this", "those", "through", "to", "up", "us", "use", "using",
    "very", "want", "we", "well", "what", "when", "where", "which", "who", "will", "with",
    "within", "work", "working", "would", "you", "your", "ability", "able", "candidate",
    "company", "day", "environment", "excellent", "experience", "familiarity", "good",
    "great", "ideal", "including", "knowledge", "least", "need", "nice", "opportunity",
    "preferred", "proven", "qualifications", "related", "required", "requirements",
    "responsibilities", "role", "seeking", "skills", "strong", "team", "teams", "understanding",
    "year", "years", "bonus", "degree", "equivalent", "field", "position", "job",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordEntry {
    pub keyword: String,
    pub frequency: u32,
    /// Earlier first mentions weigh more: 1.0 at the start, 0.5 at the end.
    pub position_weight: f32,
    pub weighted_score: f32,
}

fn terms(text: &str) -> impl Iterator<Item = String> + '_ {
    TERM.find_iter(text).map(|m| {
        m.as_str()
            .trim_end_matches(['.', '-', '/'])
            .to_lowercase()
    })
}

fn is_signal(term: &str) -> bool {
    let short_symbolic = term.contains(['+', '#']);
    (term.len() >= 2 || short_symbolic) && !STOPWORDS.contains(&term)
}

/// Ranks job-description terms by `frequency × position_weight`, keeping at most `limit`.
pub fn extract_keywords(job_description: &str, limit: usize) -> Vec<KeywordEntry> {
    let all: Vec<String> = terms(job_description).collect();
    let total = all.len().max(1) as f32;

    let mut first_seen: Vec<(String, usize)> = Vec::new();
    let mut counts: HashMap<String, u32> = HashMap::new();
    for (position, term) in all.into_iter().enumerate() {
        if !is_signal(&term) {
            continue;
        }
        let count = counts.entry(term.clone()).or_insert(0);
        if *count == 0 {
            first_seen.push((term, position));
        }
        *count += 1;
    }

    let mut entries: Vec<(KeywordEntry, usize)> = first_seen
        .into_iter()
        .map(|(keyword, position)| {
            let frequency = counts.get(&keyword).copied().unwrap_or(1);
            let position_weight = 1.0 - 0.5 * (position as f32 / total);
            (
                KeywordEntry {
                    keyword,
                    frequency,
                    position_weight,
                    weighted_score: frequency as f32 * position_weight,
                },
                position,
            )
        })
        .collect();

    entries.sort_by(|(a, pa), (b, pb)| {
        b.weighted_score
            .total_cmp(&a.weighted_score)
            .then_with(|| pa.cmp(pb))
    });
    entries.truncate(limit);
    entries.into_iter().map(|(entry, _)| entry).collect()
}

/// Lowercased terms of a piece of resume text, for whole-term lookups.
pub fn term_set(text: &str) -> HashSet<String> {
    terms(text).collect()
}

/// Keywords present as whole terms in `rewritten` but not in `original`.
pub fn keywords_added(keywords: &[KeywordEntry], original: &str, rewritten: &str) -> Vec<String> {
    let before = term_set(original);
    let after = term_set(rewritten);
    keywords
        .iter()
        .filter(|k| after.contains(&k.keyword) && !before.contains(&k.keyword))
        .map(|k| k.keyword.clone())
        .collect()
}
