//! Response format: how an answer should be presented

use super::PrototypeSet;
use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::prototypes::{PrototypeRegistry, ResponseSection};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseFormat {
    /// Visual representation (flowchart, genealogy chart)
    Diagram,
    /// Detailed explanation with context
    Explanation,
    /// Plain list of verses
    List,
    /// Counts and frequencies
    Statistics,
    /// Surrounding verses
    Context,
    /// Simple lookup
    Direct,
}

impl ResponseFormat {
    /// Whether this format needs generative synthesis rather than formatting retrieved data
    pub fn requires_llm(self) -> bool {
        match self {
            ResponseFormat::Diagram | ResponseFormat::Explanation | ResponseFormat::Context => true,
            ResponseFormat::Statistics | ResponseFormat::List | ResponseFormat::Direct => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResponseFormat::Diagram => "DIAGRAM",
            ResponseFormat::Explanation => "EXPLANATION",
            ResponseFormat::List => "LIST",
            ResponseFormat::Statistics => "STATISTICS",
            ResponseFormat::Context => "CONTEXT",
            ResponseFormat::Direct => "DIRECT",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-format similarity scores for one query
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct ResponseScores {
    /// Includes the keyword boost when `has_diagram_keyword`
    pub diagram: f32,
    pub explanation: f32,
    pub statistics: f32,
    pub context: f32,
    pub list: f32,
    pub has_diagram_keyword: bool,
}

pub(crate) struct ResponseRule {
    pub name: &'static str,
    pub applies: fn(&ResponseScores, &ResponseSection) -> bool,
    pub format: ResponseFormat,
}

/// Evaluated in order; falls through to LIST
pub(crate) const RESPONSE_RULES: &[ResponseRule] = &[
    ResponseRule {
        name: "explicit visual vocabulary",
        applies: |s, t| s.has_diagram_keyword && s.diagram > t.diagram_keyword_threshold,
        format: ResponseFormat::Diagram,
    },
    ResponseRule {
        name: "diagram phrasing",
        applies: |s, t| {
            s.diagram > t.diagram_threshold && s.diagram > s.explanation && s.diagram > s.list
        },
        format: ResponseFormat::Diagram,
    },
    ResponseRule {
        name: "statistics phrasing",
        applies: |s, t| s.statistics > t.statistics_threshold && s.statistics > s.list,
        format: ResponseFormat::Statistics,
    },
    ResponseRule {
        name: "context phrasing",
        applies: |s, t| {
            s.context > t.context_threshold && s.context > s.list && s.context > s.explanation
        },
        format: ResponseFormat::Context,
    },
    ResponseRule {
        name: "explanation phrasing",
        applies: |s, t| s.explanation > t.explanation_threshold && s.explanation > s.list,
        format: ResponseFormat::Explanation,
    },
];

pub(crate) fn decide(scores: &ResponseScores, thresholds: &ResponseSection) -> (ResponseFormat, &'static str) {
    RESPONSE_RULES
        .iter()
        .find(|rule| (rule.applies)(scores, thresholds))
        .map(|rule| (rule.format, rule.name))
        .unwrap_or((ResponseFormat::List, "default"))
}

/// Classifies how the user wants results presented
pub struct ResponseFormatClassifier {
    provider: Arc<dyn EmbeddingProvider>,
    thresholds: ResponseSection,
    /// Lowercased
    diagram_keywords: Vec<String>,
    diagram: PrototypeSet,
    explanation: PrototypeSet,
    statistics: PrototypeSet,
    context: PrototypeSet,
    list: PrototypeSet,
}

impl ResponseFormatClassifier {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        registry: &PrototypeRegistry,
    ) -> Result<Self, EmbeddingError> {
        let start = std::time::Instant::now();
        let section = &registry.response;
        let p = provider.as_ref();

        let diagram = PrototypeSet::build("diagram", &section.diagram, p)?;
        let explanation = PrototypeSet::build("explanation", &section.explanation, p)?;
        let statistics = PrototypeSet::build("statistics", &section.statistics, p)?;
        let context = PrototypeSet::build("context", &section.context, p)?;
        let list = PrototypeSet::build("list", &section.list, p)?;

        let classifier = Self {
            diagram_keywords: section
                .diagram_keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            thresholds: section.clone(),
            provider,
            diagram,
            explanation,
            statistics,
            context,
            list,
        };

        info!(
            "Response format classifier initialized in {}ms ({})",
            start.elapsed().as_millis(),
            classifier.stats()
        );

        Ok(classifier)
    }

    pub fn classify(&self, query: &str) -> ResponseFormat {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return ResponseFormat::List;
        }

        let embedding = match self.provider.embed(trimmed) {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!("Response format degraded to LIST for '{}': {}", trimmed, e);
                return ResponseFormat::List;
            }
        };

        let lowered = trimmed.to_lowercase();
        let has_diagram_keyword = self.diagram_keywords.iter().any(|k| lowered.contains(k));

        let mut scores = ResponseScores {
            diagram: self.diagram.score(&embedding),
            explanation: self.explanation.score(&embedding),
            statistics: self.statistics.score(&embedding),
            context: self.context.score(&embedding),
            list: self.list.score(&embedding),
            has_diagram_keyword,
        };
        if has_diagram_keyword {
            scores.diagram = (scores.diagram + self.thresholds.diagram_keyword_boost).min(1.0);
        }

        let (format, rule) = decide(&scores, &self.thresholds);
        debug!(
            "Response format for '{}': {} via {} (diagram={:.3}, explain={:.3}, stats={:.3}, context={:.3}, list={:.3}, keyword={})",
            trimmed,
            format,
            rule,
            scores.diagram,
            scores.explanation,
            scores.statistics,
            scores.context,
            scores.list,
            has_diagram_keyword
        );

        format
    }

    pub fn requires_llm(&self, format: ResponseFormat) -> bool {
        format.requires_llm()
    }

    pub fn stats(&self) -> String {
        format!(
            "ResponseFormatClassifier: {} diagram, {} explanation, {} statistics, {} context, {} list prototypes",
            self.diagram.len(),
            self.explanation.len(),
            self.statistics.len(),
            self.context.len(),
            self.list.len()
        )
    }
}
