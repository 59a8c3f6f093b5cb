//! Read-only verse corpus
//!
//! The corpus is loaded once at startup and never mutated afterwards.
//! `CorpusIndex` is the seam the retrieval engine consumes; `BibleCorpus`
//! is the in-memory implementation backed by per-translation JSON files.

mod bible;
mod model;
mod segment;

pub use bible::{BibleCorpus, KeywordStatistics, TranslationSource};
pub use model::{Book, Testament, Verse, VerseKey};
pub use segment::{SegmentParseError, VerseSegment};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Corpus file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read corpus file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse corpus JSON for {translation}: {source}")]
    Json {
        translation: String,
        source: serde_json::Error,
    },

    #[error("Invalid corpus data: {0}")]
    Invalid(String),

    #[error("Corpus lookup failed: {0}")]
    Lookup(String),
}

/// Exact lookup over the corpus
///
/// Implementations must be safe to share across request threads.
pub trait CorpusIndex: Send + Sync {
    /// Case-insensitive substring search for a single term, in corpus order
    fn keyword_search(&self, term: &str) -> Result<Vec<Verse>, CorpusError>;

    /// Case-insensitive substring search for a phrase, in corpus order
    ///
    /// Runs of whitespace in both phrase and text are treated as one space.
    fn phrase_search(&self, phrase: &str) -> Result<Vec<Verse>, CorpusError>;

    /// Resolve a book by any of its names or short names
    fn resolve_book(&self, name: &str) -> Option<Book>;

    /// Canonical short name for an exact name or alias, without partial matching
    fn canonical_short(&self, name: &str) -> Option<String>;
}

#[cfg(test)]
pub(crate) use bible::fixtures;
