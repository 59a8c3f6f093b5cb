//! Search intent: literal lookup, semantic search, or both

use super::PrototypeSet;
use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::prototypes::{CompiledLiteralPattern, IntentSection, PrototypeRegistry};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentType {
    /// Exact substring search only
    Keyword,
    /// Vector similarity search only
    Semantic,
    /// Exact matches first, padded with semantic matches
    Hybrid,
}

impl IntentType {
    pub fn as_str(self) -> &'static str {
        match self {
            IntentType::Keyword => "KEYWORD",
            IntentType::Semantic => "SEMANTIC",
            IntentType::Hybrid => "HYBRID",
        }
    }
}

impl fmt::Display for IntentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a query should be searched
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchIntent {
    pub intent_type: IntentType,
    /// Literal term for the keyword pass, if one was identified
    pub keyword: Option<String>,
    pub original_query: String,
    /// Why this intent was chosen; never empty
    pub reason: String,
}

impl SearchIntent {
    pub fn new(
        intent_type: IntentType,
        keyword: Option<String>,
        original_query: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            intent_type,
            keyword,
            original_query: original_query.into(),
            reason: reason.into(),
        }
    }

    pub fn needs_keyword_search(&self) -> bool {
        matches!(self.intent_type, IntentType::Keyword | IntentType::Hybrid)
    }

    pub fn needs_semantic_search(&self) -> bool {
        matches!(self.intent_type, IntentType::Semantic | IntentType::Hybrid)
    }

    /// Term for the keyword pass: the extracted keyword, else the whole query
    pub fn keyword_term(&self) -> &str {
        self.keyword
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or(&self.original_query)
    }
}

/// Inputs to the intent decision
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IntentSignals {
    pub keyword_score: f32,
    pub semantic_score: f32,
    /// Literal term found by a configured pattern
    pub literal: Option<String>,
}

pub(crate) struct IntentRule {
    pub name: &'static str,
    pub applies: fn(&IntentSignals, &IntentSection) -> bool,
    pub intent: IntentType,
}

/// Evaluated in order; the first rule that applies decides
pub(crate) const INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        name: "literal term within conceptual phrasing",
        applies: |s, t| {
            s.literal.is_some()
                && s.semantic_score >= t.semantic_threshold
                && s.semantic_score > s.keyword_score
        },
        intent: IntentType::Hybrid,
    },
    IntentRule {
        name: "explicit literal term",
        applies: |s, _| s.literal.is_some(),
        intent: IntentType::Keyword,
    },
    IntentRule {
        name: "keyword and semantic phrasing both moderate",
        applies: |s, t| {
            s.keyword_score >= t.hybrid_threshold
                && s.semantic_score >= t.hybrid_threshold
                && (s.keyword_score - s.semantic_score).abs() <= t.hybrid_margin
        },
        intent: IntentType::Hybrid,
    },
    IntentRule {
        name: "keyword phrasing without an extractable term",
        applies: |s, t| s.keyword_score >= t.keyword_threshold && s.keyword_score > s.semantic_score,
        intent: IntentType::Hybrid,
    },
    IntentRule {
        name: "conceptual phrasing",
        applies: |_, _| true,
        intent: IntentType::Semantic,
    },
];

pub(crate) fn decide(signals: &IntentSignals, thresholds: &IntentSection) -> &'static IntentRule {
    INTENT_RULES
        .iter()
        .find(|rule| (rule.applies)(signals, thresholds))
        .unwrap_or(&INTENT_RULES[INTENT_RULES.len() - 1])
}

/// Classifies queries as KEYWORD, SEMANTIC or HYBRID
pub struct IntentClassifier {
    provider: Arc<dyn EmbeddingProvider>,
    thresholds: IntentSection,
    literal_patterns: Vec<CompiledLiteralPattern>,
    keyword: PrototypeSet,
    semantic: PrototypeSet,
}

impl IntentClassifier {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        registry: &PrototypeRegistry,
    ) -> Result<Self, EmbeddingError> {
        let start = std::time::Instant::now();

        let keyword = PrototypeSet::build("keyword", &registry.intent.keyword, provider.as_ref())?;
        let semantic =
            PrototypeSet::build("semantic", &registry.intent.semantic, provider.as_ref())?;

        let classifier = Self {
            provider,
            thresholds: registry.intent.clone(),
            literal_patterns: registry.literal_patterns.clone(),
            keyword,
            semantic,
        };

        info!(
            "Intent classifier initialized in {}ms ({})",
            start.elapsed().as_millis(),
            classifier.stats()
        );

        Ok(classifier)
    }

    pub fn classify(&self, query: &str) -> SearchIntent {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return SearchIntent::new(
                IntentType::Semantic,
                None,
                query,
                "Empty query; defaulting to semantic search",
            );
        }

        let thresholds = &self.thresholds;
        if !trimmed.contains(char::is_whitespace)
            && trimmed.chars().count() < thresholds.short_token_threshold
        {
            debug!("Intent for '{}': HYBRID (short single term)", trimmed);
            return SearchIntent::new(
                IntentType::Hybrid,
                Some(trimmed.to_string()),
                query,
                format!(
                    "Short single term (< {} chars): exact match plus semantic expansion",
                    thresholds.short_token_threshold
                ),
            );
        }

        let embedding = match self.provider.embed(trimmed) {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!("Intent classification degraded to SEMANTIC for '{}': {}", trimmed, e);
                return SearchIntent::new(
                    IntentType::Semantic,
                    None,
                    query,
                    format!("Embedding failed ({}); defaulting to semantic search", e),
                );
            }
        };

        let signals = IntentSignals {
            keyword_score: self.keyword.score(&embedding),
            semantic_score: self.semantic.score(&embedding),
            literal: self.extract_literal(trimmed),
        };
        let rule = decide(&signals, thresholds);

        debug!(
            "Intent for '{}': {} via '{}' (keyword={:.3}, semantic={:.3}, literal={:?})",
            trimmed,
            rule.intent,
            rule.name,
            signals.keyword_score,
            signals.semantic_score,
            signals.literal
        );

        let keyword = match rule.intent {
            IntentType::Semantic => None,
            IntentType::Keyword | IntentType::Hybrid => signals.literal.clone(),
        };

        SearchIntent::new(
            rule.intent,
            keyword,
            query,
            format!(
                "{} (keyword={:.2}, semantic={:.2})",
                rule.name, signals.keyword_score, signals.semantic_score
            ),
        )
    }

    pub fn stats(&self) -> String {
        format!(
            "IntentClassifier: {} keyword prototypes, {} semantic prototypes, {} literal patterns",
            self.keyword.len(),
            self.semantic.len(),
            self.literal_patterns.len()
        )
    }

    /// First literal term any configured pattern finds in `query`
    fn extract_literal(&self, query: &str) -> Option<String> {
        self.literal_patterns.iter().find_map(|p| p.extract(query))
    }
}
