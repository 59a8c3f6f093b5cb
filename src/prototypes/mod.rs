//! Prototype registry for configuration-driven query classification
//!
//! This module provides:
//! - Prototype phrase sets for scope, intent and response-format classification
//! - Per-category similarity thresholds
//! - Pre-compiled literal-term patterns used by the intent classifier
//! - The book catalog used to generate single-book scope prototypes
//!
//! A built-in registry is compiled into the binary from
//! `config/prototypes.toml`; `PrototypeRegistry::from_file` loads a
//! replacement so phrases and thresholds can be re-tuned without a rebuild.

use crate::corpus::Testament;
use crate::error::{Result, VersewiseError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const BUILTIN_PROTOTYPES: &str = include_str!("../../config/prototypes.toml");

/// Placeholder replaced by a book name in single-book templates
pub const BOOK_NAME_PLACEHOLDER: &str = "{name}";

/// One testament scope category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestamentPrototypes {
    pub testament: Testament,
    pub label: String,
    /// Literal spans removed from the query when this category wins
    #[serde(default)]
    pub triggers: Vec<String>,
    pub phrases: Vec<String>,
}

/// A named group of books (e.g. the Gospels)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupPrototypes {
    pub name: String,
    pub label: String,
    /// Short names of member books
    pub books: Vec<String>,
    #[serde(default)]
    pub triggers: Vec<String>,
    pub phrases: Vec<String>,
}

/// Scope extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeSection {
    pub none_threshold: f32,
    pub testament_threshold: f32,
    pub group_threshold: f32,
    pub book_threshold: f32,
    /// Phrasing that carries no scope restriction
    #[serde(default)]
    pub none: Vec<String>,
    #[serde(default)]
    pub book_templates_ko: Vec<String>,
    #[serde(default)]
    pub book_templates_en: Vec<String>,
    #[serde(default)]
    pub testament: Vec<TestamentPrototypes>,
    #[serde(default)]
    pub group: Vec<GroupPrototypes>,
}

/// Literal-term pattern; capture group 1 is the extracted term
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiteralPatternConfig {
    pub name: String,
    pub pattern: String,
}

/// Search intent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentSection {
    pub keyword_threshold: f32,
    pub semantic_threshold: f32,
    pub hybrid_threshold: f32,
    pub hybrid_margin: f32,
    /// Single tokens shorter than this (in chars) go straight to HYBRID
    pub short_token_threshold: usize,
    pub keyword: Vec<String>,
    pub semantic: Vec<String>,
    #[serde(default)]
    pub literal_pattern: Vec<LiteralPatternConfig>,
}

/// Response format configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSection {
    pub diagram_threshold: f32,
    pub statistics_threshold: f32,
    pub context_threshold: f32,
    pub explanation_threshold: f32,
    pub diagram_keyword_threshold: f32,
    pub diagram_keyword_boost: f32,
    #[serde(default)]
    pub diagram_keywords: Vec<String>,
    pub diagram: Vec<String>,
    pub explanation: Vec<String>,
    pub statistics: Vec<String>,
    pub context: Vec<String>,
    pub list: Vec<String>,
}

/// Catalog entry used for single-book detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookEntry {
    pub short: String,
    pub name: String,
    #[serde(default)]
    pub english: Option<String>,
    pub testament: Testament,
}

impl BookEntry {
    /// Names a query may use to mention this book
    pub fn mention_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.english.as_deref())
    }
}

/// Prototype file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrototypeConfig {
    pub scope: ScopeSection,
    pub intent: IntentSection,
    pub response: ResponseSection,
    #[serde(default, rename = "book")]
    pub books: Vec<BookEntry>,
}

/// Compiled literal-term pattern
#[derive(Debug, Clone)]
pub struct CompiledLiteralPattern {
    pub name: String,
    pub regex: Regex,
}

impl CompiledLiteralPattern {
    /// The trimmed first capture, if the pattern matches and it is not blank
    pub fn extract(&self, query: &str) -> Option<String> {
        self.regex
            .captures(query)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Prototype registry with validated phrase sets and compiled patterns
#[derive(Debug, Clone)]
pub struct PrototypeRegistry {
    pub scope: ScopeSection,
    pub intent: IntentSection,
    pub response: ResponseSection,
    pub books: Vec<BookEntry>,
    pub literal_patterns: Vec<CompiledLiteralPattern>,
}

impl PrototypeRegistry {
    /// The registry shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_PROTOTYPES)
    }

    /// Load a registry from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| VersewiseError::Io {
            source: e,
            context: format!("Failed to read prototype file: {:?}", path),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PrototypeConfig = toml::from_str(content)?;
        Self::from_config(config)
    }

    /// Validate a parsed configuration and compile its patterns
    pub fn from_config(config: PrototypeConfig) -> Result<Self> {
        validate(&config)?;

        let literal_patterns = config
            .intent
            .literal_pattern
            .iter()
            .map(|lp| {
                let regex = Regex::new(&lp.pattern).map_err(|e| {
                    VersewiseError::Prototype(format!(
                        "Invalid literal pattern '{}': {}",
                        lp.name, e
                    ))
                })?;
                if regex.captures_len() < 2 {
                    return Err(VersewiseError::Prototype(format!(
                        "Literal pattern '{}' needs a capture group",
                        lp.name
                    )));
                }
                Ok(CompiledLiteralPattern {
                    name: lp.name.clone(),
                    regex,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            scope: config.scope,
            intent: config.intent,
            response: config.response,
            books: config.books,
            literal_patterns,
        })
    }

    /// Look up a catalog book by short name
    pub fn book(&self, short: &str) -> Option<&BookEntry> {
        self.books.iter().find(|b| b.short == short)
    }

    /// Extract the first literal term any pattern finds in `query`
    pub fn extract_literal(&self, query: &str) -> Option<(&str, String)> {
        self.literal_patterns
            .iter()
            .find_map(|p| p.extract(query).map(|t| (p.name.as_str(), t)))
    }

    /// Total number of phrases across all sets (excluding generated book phrases)
    pub fn phrase_count(&self) -> usize {
        let scope = self.scope.none.len()
            + self.scope.testament.iter().map(|t| t.phrases.len()).sum::<usize>()
            + self.scope.group.iter().map(|g| g.phrases.len()).sum::<usize>();
        let intent = self.intent.keyword.len() + self.intent.semantic.len();
        let r = &self.response;
        let response = r.diagram.len()
            + r.explanation.len()
            + r.statistics.len()
            + r.context.len()
            + r.list.len();
        scope + intent + response
    }
}

fn validate(config: &PrototypeConfig) -> Result<()> {
    let mut problems = Vec::new();

    let thresholds = [
        ("scope.none_threshold", config.scope.none_threshold),
        ("scope.testament_threshold", config.scope.testament_threshold),
        ("scope.group_threshold", config.scope.group_threshold),
        ("scope.book_threshold", config.scope.book_threshold),
        ("intent.keyword_threshold", config.intent.keyword_threshold),
        ("intent.semantic_threshold", config.intent.semantic_threshold),
        ("intent.hybrid_threshold", config.intent.hybrid_threshold),
        ("intent.hybrid_margin", config.intent.hybrid_margin),
        ("response.diagram_threshold", config.response.diagram_threshold),
        ("response.statistics_threshold", config.response.statistics_threshold),
        ("response.context_threshold", config.response.context_threshold),
        ("response.explanation_threshold", config.response.explanation_threshold),
        (
            "response.diagram_keyword_threshold",
            config.response.diagram_keyword_threshold,
        ),
        ("response.diagram_keyword_boost", config.response.diagram_keyword_boost),
    ];
    for (name, value) in thresholds {
        if !(0.0..=1.0).contains(&value) {
            problems.push(format!("{} must be between 0.0 and 1.0 (got {})", name, value));
        }
    }

    let required_sets = [
        ("intent.keyword", &config.intent.keyword),
        ("intent.semantic", &config.intent.semantic),
        ("response.diagram", &config.response.diagram),
        ("response.explanation", &config.response.explanation),
        ("response.statistics", &config.response.statistics),
        ("response.context", &config.response.context),
        ("response.list", &config.response.list),
    ];
    for (name, set) in required_sets {
        if set.iter().all(|p| p.trim().is_empty()) {
            problems.push(format!("{} must contain at least one phrase", name));
        }
    }

    let mut seen_testaments = HashSet::new();
    for t in &config.scope.testament {
        if !seen_testaments.insert(t.testament) {
            problems.push(format!("scope.testament {} is defined twice", t.testament));
        }
        if t.phrases.is_empty() {
            problems.push(format!("scope.testament {} has no phrases", t.testament));
        }
    }

    let known: HashSet<&str> = config.books.iter().map(|b| b.short.as_str()).collect();
    let mut seen_groups = HashSet::new();
    for g in &config.scope.group {
        if !seen_groups.insert(g.name.as_str()) {
            problems.push(format!("scope.group '{}' is defined twice", g.name));
        }
        if g.books.is_empty() || g.phrases.is_empty() {
            problems.push(format!("scope.group '{}' needs books and phrases", g.name));
        }
        if !known.is_empty() {
            for short in g.books.iter().filter(|s| !known.contains(s.as_str())) {
                problems.push(format!(
                    "scope.group '{}' references unknown book '{}'",
                    g.name, short
                ));
            }
        }
    }

    for template in config
        .scope
        .book_templates_ko
        .iter()
        .chain(&config.scope.book_templates_en)
    {
        if !template.contains(BOOK_NAME_PLACEHOLDER) {
            problems.push(format!(
                "Book template '{}' is missing {}",
                template, BOOK_NAME_PLACEHOLDER
            ));
        }
    }

    let mut seen_books = HashSet::new();
    for b in &config.books {
        if !seen_books.insert(b.short.as_str()) {
            problems.push(format!("Book '{}' is defined twice", b.short));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(VersewiseError::Prototype(problems.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_loads() {
        let registry = PrototypeRegistry::builtin().unwrap();
        assert_eq!(registry.books.len(), 66);
        assert_eq!(registry.scope.testament.len(), 2);
        assert!(registry.scope.group.iter().any(|g| g.name == "gospels"));
        assert_eq!(registry.response.diagram_threshold, 0.50);
        assert_eq!(registry.response.context_threshold, 0.48);
        assert_eq!(registry.response.explanation_threshold, 0.45);
        assert!(registry.phrase_count() > 100);

        let gospels = registry.scope.group.iter().find(|g| g.name == "gospels").unwrap();
        assert_eq!(gospels.books, vec!["마", "막", "눅", "요"]);
        assert_eq!(registry.book("롬").unwrap().english.as_deref(), Some("Romans"));
    }

    #[test]
    fn test_literal_extraction() {
        let registry = PrototypeRegistry::builtin().unwrap();

        let (name, term) = registry.extract_literal("'사랑'이라는 단어가 들어간 구절").unwrap();
        assert_eq!(name, "quoted");
        assert_eq!(term, "사랑");

        assert_eq!(registry.extract_literal("모세가 나오는 구절").unwrap().1, "모세");
        assert_eq!(
            registry.extract_literal("verses containing the word grace").unwrap().1,
            "grace"
        );
        assert!(registry.extract_literal("힘들 때 힘이 되는 말씀").is_none());
    }

    #[test]
    fn test_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("prototypes.toml");
        std::fs::write(&path, BUILTIN_PROTOTYPES).unwrap();

        let registry = PrototypeRegistry::from_file(&path).unwrap();
        assert_eq!(registry.books.len(), 66);

        let missing = PrototypeRegistry::from_file(&temp.path().join("nope.toml"));
        assert!(matches!(missing, Err(VersewiseError::Io { .. })));
    }

    #[test]
    fn test_validation_collects_problems() {
        let mut config: PrototypeConfig = toml::from_str(BUILTIN_PROTOTYPES).unwrap();
        config.response.diagram_threshold = 1.5;
        config.intent.keyword.clear();
        config.scope.group[0].books.push("없음".to_string());
        config.scope.book_templates_en.push("no placeholder".to_string());

        let err = PrototypeRegistry::from_config(config).unwrap_err().to_string();
        assert!(err.contains("response.diagram_threshold"));
        assert!(err.contains("intent.keyword"));
        assert!(err.contains("unknown book '없음'"));
        assert!(err.contains("missing {name}"));
    }

    #[test]
    fn test_invalid_literal_pattern_rejected() {
        let mut config: PrototypeConfig = toml::from_str(BUILTIN_PROTOTYPES).unwrap();
        config.intent.literal_pattern.push(LiteralPatternConfig {
            name: "broken".to_string(),
            pattern: "([unclosed".to_string(),
        });
        assert!(matches!(
            PrototypeRegistry::from_config(config),
            Err(VersewiseError::Prototype(_))
        ));

        let mut config: PrototypeConfig = toml::from_str(BUILTIN_PROTOTYPES).unwrap();
        config.intent.literal_pattern.push(LiteralPatternConfig {
            name: "no_group".to_string(),
            pattern: "word".to_string(),
        });
        assert!(PrototypeRegistry::from_config(config).is_err());
    }
}
