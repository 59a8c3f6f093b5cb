//! Second-stage scoring of vector-search candidates
//!
//! Raw bi-encoder similarity is adjusted by lexical overlap with the query
//! and a penalty for long texts that likely span several verses.

use ahash::AHashSet;

/// Boost per distinct query token found in the candidate text
pub const TOKEN_BOOST: f32 = 0.05;

/// Cap on the total lexical boost
pub const MAX_KEYWORD_BOOST: f32 = 0.2;

/// Tokens must have more characters than this to count
const MIN_TOKEN_CHARS: usize = 2;

/// Lexical reranker bound to one query
#[derive(Debug, Clone)]
pub struct Reranker {
    tokens: Vec<String>,
}

impl Reranker {
    pub fn new(query: &str) -> Self {
        let mut seen = AHashSet::new();
        let tokens = query
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .filter(|t| t.chars().count() > MIN_TOKEN_CHARS)
            .filter(|t| seen.insert(t.clone()))
            .collect();

        Self { tokens }
    }

    /// Distinct lowercased query tokens that take part in the boost
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Lexical boost for `text`, in `[0, MAX_KEYWORD_BOOST]`
    pub fn keyword_boost(&self, text: &str) -> f32 {
        if self.tokens.is_empty() {
            return 0.0;
        }

        let lowered = text.to_lowercase();
        let found = self
            .tokens
            .iter()
            .filter(|t| lowered.contains(t.as_str()))
            .count();

        (found as f32 * TOKEN_BOOST).min(MAX_KEYWORD_BOOST)
    }

    /// Final score for a candidate with similarity `raw_score`, clamped to `[0, 1]`
    pub fn score(&self, raw_score: f32, text: &str) -> f32 {
        let score = (raw_score + self.keyword_boost(text)) * length_factor(text);
        if score.is_nan() {
            return 0.0;
        }
        score.clamp(0.0, 1.0)
    }
}

/// Penalty for long texts: 1.0 up to 300 characters, 0.95 up to 500, then 0.9
pub fn length_factor(text: &str) -> f32 {
    match text.chars().count() {
        0..=300 => 1.0,
        301..=500 => 0.95,
        _ => 0.9,
    }
}
