//! Smart search combining scope extraction, intent and two-stage retrieval

use crate::classify::{
    IntentClassifier, IntentType, ResponseFormat, ResponseFormatClassifier, ScopeClassifier,
    ScopeConstraint, SearchIntent,
};
use crate::config::SearchConfig;
use crate::corpus::{CorpusError, CorpusIndex, VerseKey, VerseSegment};
use crate::embedding::{EmbeddingError, EmbeddingProvider, VectorIndex, VectorIndexError};
use crate::prototypes::PrototypeRegistry;
use crate::retrieval::{deduplicate_matches, exclude_matches, Reranker, SearchResult, VerseMatch};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Embedding generation failed: {0}")]
    EmbeddingError(#[from] EmbeddingError),

    #[error("Vector search failed: {0}")]
    VectorSearchError(#[from] VectorIndexError),

    #[error("Corpus lookup failed: {0}")]
    CorpusError(#[from] CorpusError),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid engine configuration: {0}")]
    Configuration(String),
}

/// Per-call overrides of the configured search settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    pub max_results: Option<usize>,
    /// Clamped to `[0, 1]`
    pub min_score: Option<f32>,
    /// Translation tag; only verses of this translation are returned
    pub version_filter: Option<String>,
}

impl SearchOptions {
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = Some(min_score);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version_filter = Some(version.into());
        self
    }
}

/// Engine settings and classifier sizes, for diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    pub candidate_count: usize,
    pub candidate_floor: f32,
    pub result_count: usize,
    pub min_score: f32,
    pub default_translation: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub indexed_segments: usize,
    pub scope_classifier: String,
    pub intent_classifier: String,
    pub response_classifier: String,
}

/// Candidate carrying its corpus position for tie-breaking
struct Ranked {
    matched: VerseMatch,
    order: (u32, u32, u32),
}

/// Retrieval engine
///
/// Every collaborator is read-only after construction, so one engine can
/// serve any number of threads concurrently.
pub struct RetrievalEngine {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    corpus: Arc<dyn CorpusIndex>,
    vector_index: Arc<dyn VectorIndex>,
    scope_classifier: ScopeClassifier,
    intent_classifier: IntentClassifier,
    response_classifier: ResponseFormatClassifier,
    config: SearchConfig,
}

impl RetrievalEngine {
    /// Create a new engine, embedding every classifier prototype up front
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        corpus: Arc<dyn CorpusIndex>,
        vector_index: Arc<dyn VectorIndex>,
        registry: &PrototypeRegistry,
        config: SearchConfig,
    ) -> Result<Self, SearchError> {
        if vector_index.dimension() != embedding_provider.dimension() {
            return Err(SearchError::Configuration(format!(
                "vector index dimension {} does not match embedding dimension {}",
                vector_index.dimension(),
                embedding_provider.dimension()
            )));
        }
        if config.candidate_count == 0 {
            return Err(SearchError::Configuration(
                "candidate_count must be greater than 0".to_string(),
            ));
        }

        let scope_classifier = ScopeClassifier::new(embedding_provider.clone(), registry)?;
        let intent_classifier = IntentClassifier::new(embedding_provider.clone(), registry)?;
        let response_classifier =
            ResponseFormatClassifier::new(embedding_provider.clone(), registry)?;

        info!(
            "Retrieval engine ready: {} indexed segments, candidates={}, results={}, min_score={}",
            vector_index.len(),
            config.candidate_count,
            config.result_count,
            config.min_score
        );

        Ok(Self {
            embedding_provider,
            corpus,
            vector_index,
            scope_classifier,
            intent_classifier,
            response_classifier,
            config,
        })
    }

    /// Search with the configured defaults
    pub fn search_default(&self, query: &str) -> SearchResult {
        self.search(query, &SearchOptions::default())
    }

    /// Run a smart search
    ///
    /// Never fails: errors are reported through `SearchResult::success`.
    pub fn search(&self, query: &str, options: &SearchOptions) -> SearchResult {
        let start = Instant::now();
        let max_results = options.max_results.unwrap_or(self.config.result_count);
        let min_score = effective_min_score(options.min_score.unwrap_or(self.config.min_score));
        let version = options
            .version_filter
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let trimmed = query.trim();
        if trimmed.is_empty() {
            let e = SearchError::InvalidQuery("Query text cannot be empty".to_string());
            warn!("Rejected search: {}", e);
            return SearchResult::failure(query, e.to_string(), elapsed_ms(start), None, None);
        }

        // Step 1: Scope, then intent on the scope-stripped query
        let scope = self.extract_scope(trimmed);
        let search_query = scope.search_query().to_string();
        let intent = self.intent_classifier.classify(&search_query);

        info!(
            "Search '{}' -> '{}' [{}] scope={} keyword={:?}",
            trimmed, search_query, intent.intent_type, scope, intent.keyword
        );

        // Step 2: Branch on intent
        let outcome = match intent.intent_type {
            IntentType::Keyword => {
                self.keyword_search(&intent, &scope, version, max_results)
            }
            IntentType::Hybrid => {
                self.hybrid_search(&search_query, &intent, &scope, version, min_score, max_results)
            }
            IntentType::Semantic => {
                self.semantic_search(&search_query, &scope, version, min_score, max_results)
            }
        };

        let elapsed = elapsed_ms(start);
        match outcome {
            Ok(results) => {
                info!(
                    "Search completed in {}ms: '{}' [{}] -> {} results",
                    elapsed,
                    trimmed,
                    intent.intent_type,
                    results.len()
                );
                SearchResult::success(trimmed, results, elapsed, intent, scope)
            }
            Err(e) => {
                error!("Search failed for '{}': {}", trimmed, e);
                SearchResult::failure(trimmed, e.to_string(), elapsed, Some(intent), Some(scope))
            }
        }
    }

    /// Exact matches in corpus order, all scored 1.0
    ///
    /// Parallel translations of one verse are all kept.
    fn keyword_search(
        &self,
        intent: &SearchIntent,
        scope: &ScopeConstraint,
        version: Option<&str>,
        max_results: usize,
    ) -> Result<Vec<VerseMatch>, SearchError> {
        let mut results = self.exact_matches(intent.keyword_term(), scope, version)?;
        results.truncate(max_results);
        Ok(results)
    }

    /// Exact matches first, padded with semantic matches for other verses
    fn hybrid_search(
        &self,
        query: &str,
        intent: &SearchIntent,
        scope: &ScopeConstraint,
        version: Option<&str>,
        min_score: f32,
        max_results: usize,
    ) -> Result<Vec<VerseMatch>, SearchError> {
        let mut results =
            deduplicate_matches(self.exact_matches(intent.keyword_term(), scope, version)?);
        results.truncate(max_results);

        if results.len() < max_results {
            let taken: HashSet<VerseKey> = results.iter().map(|m| m.key()).collect();
            let semantic = exclude_matches(
                self.ranked_candidates(query, scope, version, min_score)?,
                &taken,
            );
            let room = max_results - results.len();
            debug!(
                "Hybrid: {} exact matches, {} semantic candidates for {} open slots",
                results.len(),
                semantic.len(),
                room
            );
            results.extend(semantic.into_iter().take(room));
        }

        Ok(results)
    }

    /// Two-stage retrieval: vector candidates, then lexical rerank
    fn semantic_search(
        &self,
        query: &str,
        scope: &ScopeConstraint,
        version: Option<&str>,
        min_score: f32,
        max_results: usize,
    ) -> Result<Vec<VerseMatch>, SearchError> {
        let mut results = self.ranked_candidates(query, scope, version, min_score)?;
        results.truncate(max_results);
        Ok(results)
    }

    fn exact_matches(
        &self,
        term: &str,
        scope: &ScopeConstraint,
        version: Option<&str>,
    ) -> Result<Vec<VerseMatch>, SearchError> {
        let term = term.trim();
        let verses = if term.contains(char::is_whitespace) {
            self.corpus.phrase_search(term)?
        } else {
            self.corpus.keyword_search(term)?
        };

        let found = verses.len();
        let matches: Vec<VerseMatch> = verses
            .iter()
            .filter(|v| matches_version(&v.translation, version))
            .filter(|v| scope.matches_verse(v))
            .map(VerseMatch::exact)
            .collect();

        debug!(
            "Exact search for '{}': {} hits, {} after filters",
            term,
            found,
            matches.len()
        );
        Ok(matches)
    }

    /// Every candidate passing the filters and `min_score`, best first, one per verse
    fn ranked_candidates(
        &self,
        query: &str,
        scope: &ScopeConstraint,
        version: Option<&str>,
        min_score: f32,
    ) -> Result<Vec<VerseMatch>, SearchError> {
        // Stage 1: Bi-encoder candidates at a permissive floor
        let embedding = self.embedding_provider.embed(query)?;
        let neighbors = self.vector_index.nearest_neighbors(
            &embedding,
            self.config.candidate_count,
            self.config.candidate_floor,
        )?;
        let retrieved = neighbors.len();

        // Stage 2: Parse, filter, rerank
        let reranker = Reranker::new(query);
        let mut ranked = Vec::with_capacity(neighbors.len());

        for neighbor in neighbors {
            let segment = match VerseSegment::parse(&neighbor.text, &self.config.default_translation)
            {
                Ok(segment) => segment,
                Err(e) => {
                    warn!("Dropping candidate: {}", e);
                    continue;
                }
            };

            if !matches_version(&segment.translation, version) {
                continue;
            }

            let book = self.corpus.resolve_book(&segment.book_name);
            let allowed = match &book {
                Some(book) => scope.matches(Some(&book.short), Some(book.testament)),
                None => scope.matches(None, None),
            };
            if !allowed {
                continue;
            }

            let reranked_score = reranker.score(neighbor.score, &segment.text);
            if reranked_score < min_score {
                continue;
            }

            let order = (
                book.as_ref().map(|b| b.number).unwrap_or(u32::MAX),
                segment.chapter,
                segment.verse,
            );
            ranked.push(Ranked {
                order,
                matched: VerseMatch {
                    reference: format!(
                        "{} {}:{}",
                        segment.book_name, segment.chapter, segment.verse
                    ),
                    book_short: book
                        .as_ref()
                        .map(|b| b.short.clone())
                        .unwrap_or_else(|| segment.book_name.clone()),
                    testament: book.as_ref().map(|b| b.testament),
                    translation: segment.translation,
                    book_name: segment.book_name,
                    chapter: segment.chapter,
                    verse: segment.verse,
                    title: segment.title,
                    text: segment.text,
                    raw_score: neighbor.score,
                    reranked_score,
                },
            });
        }

        ranked.sort_by(|a, b| {
            b.matched
                .reranked_score
                .partial_cmp(&a.matched.reranked_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.order.cmp(&b.order))
        });

        let matches = deduplicate_matches(ranked.into_iter().map(|r| r.matched).collect());
        debug!(
            "Semantic search for '{}': {} candidates, {} after rerank and filters",
            query,
            retrieved,
            matches.len()
        );
        Ok(matches)
    }

    /// Scope for `query`, with member books named as the corpus names them
    pub fn extract_scope(&self, query: &str) -> ScopeConstraint {
        self.scope_classifier
            .extract(query)
            .with_canonical_books(self.corpus.as_ref())
    }

    pub fn classify_intent(&self, query: &str) -> SearchIntent {
        self.intent_classifier.classify(query)
    }

    pub fn classify_response_format(&self, query: &str) -> ResponseFormat {
        self.response_classifier.classify(query)
    }

    pub fn requires_llm(&self, format: ResponseFormat) -> bool {
        self.response_classifier.requires_llm(format)
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            candidate_count: self.config.candidate_count,
            candidate_floor: self.config.candidate_floor,
            result_count: self.config.result_count,
            min_score: self.config.min_score,
            default_translation: self.config.default_translation.clone(),
            embedding_model: self.embedding_provider.model_name().to_string(),
            embedding_dimension: self.embedding_provider.dimension(),
            indexed_segments: self.vector_index.len(),
            scope_classifier: self.scope_classifier.stats(),
            intent_classifier: self.intent_classifier.stats(),
            response_classifier: self.response_classifier.stats(),
        }
    }
}

fn matches_version(translation: &str, version: Option<&str>) -> bool {
    version.map_or(true, |v| translation.eq_ignore_ascii_case(v))
}

fn effective_min_score(min_score: f32) -> f32 {
    if min_score.is_nan() {
        return 0.0;
    }
    min_score.clamp(0.0, 1.0)
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
