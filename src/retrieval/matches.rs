//! Scored verse matches and search result snapshots

use crate::classify::{IntentType, ScopeConstraint, ScopeKind, SearchIntent};
use crate::corpus::{Testament, Verse, VerseKey};
use serde::Serialize;

/// A verse with its relevance scores
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerseMatch {
    /// e.g. "요한복음 3:16"
    pub reference: String,
    pub translation: String,
    pub book_name: String,
    /// Canonical short name, or the stored book name when it could not be resolved
    pub book_short: String,
    pub chapter: u32,
    pub verse: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub text: String,
    pub testament: Option<Testament>,

    /// Bi-encoder similarity, or exactly 1.0 for literal matches
    pub raw_score: f32,

    /// Score after lexical reranking (0.0 to 1.0, higher is better)
    pub reranked_score: f32,
}

impl VerseMatch {
    /// Literal match; both scores are 1.0
    pub fn exact(verse: &Verse) -> Self {
        Self {
            reference: verse.reference(),
            translation: verse.translation.clone(),
            book_name: verse.book_name.clone(),
            book_short: verse.book_short.clone(),
            chapter: verse.chapter,
            verse: verse.verse,
            title: verse.title.clone(),
            text: verse.text.clone(),
            testament: Some(verse.testament),
            raw_score: 1.0,
            reranked_score: 1.0,
        }
    }

    pub fn key(&self) -> VerseKey {
        VerseKey {
            book_short: self.book_short.clone(),
            chapter: self.chapter,
            verse: self.verse,
        }
    }

    /// First `max_chars` characters of the text
    pub fn preview(&self, max_chars: usize) -> String {
        if self.text.chars().count() <= max_chars {
            self.text.clone()
        } else {
            let cut: String = self.text.chars().take(max_chars).collect();
            format!("{}...", cut)
        }
    }
}

/// Outcome of one search call
///
/// A failed search (`success == false`) is distinct from a successful
/// search that found nothing.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub query: String,
    pub results: Vec<VerseMatch>,
    pub total_results: usize,
    pub elapsed_ms: u64,
    pub intent: Option<SearchIntent>,
    pub scope: Option<ScopeConstraint>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResult {
    pub fn success(
        query: impl Into<String>,
        results: Vec<VerseMatch>,
        elapsed_ms: u64,
        intent: SearchIntent,
        scope: ScopeConstraint,
    ) -> Self {
        Self {
            query: query.into(),
            total_results: results.len(),
            results,
            elapsed_ms,
            intent: Some(intent),
            scope: Some(scope),
            success: true,
            error: None,
        }
    }

    /// Failed search; intent and scope are kept when classification got that far
    pub fn failure(
        query: impl Into<String>,
        message: impl Into<String>,
        elapsed_ms: u64,
        intent: Option<SearchIntent>,
        scope: Option<ScopeConstraint>,
    ) -> Self {
        Self {
            query: query.into(),
            results: Vec::new(),
            total_results: 0,
            elapsed_ms,
            intent,
            scope,
            success: false,
            error: Some(message.into()),
        }
    }

    /// Successful search with no matches
    pub fn is_empty(&self) -> bool {
        self.success && self.results.is_empty()
    }

    pub fn search_method(&self) -> Option<IntentType> {
        self.intent.as_ref().map(|i| i.intent_type)
    }

    pub fn detected_scope_type(&self) -> ScopeKind {
        self.scope.as_ref().map(|s| s.kind).unwrap_or(ScopeKind::None)
    }

    pub fn detected_scope(&self) -> Option<&str> {
        self.scope.as_ref().and_then(|s| s.description.as_deref())
    }
}
