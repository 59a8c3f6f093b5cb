//! Smart search over the verse corpus
//!
//! `RetrievalEngine` extracts the query's scope, classifies its intent and
//! then runs an exact search, a two-stage semantic search (vector
//! candidates reranked by lexical overlap), or both.

mod deduplication;
mod engine;
mod matches;
mod render;
mod reranker;

pub use deduplication::{deduplicate_matches, exclude_matches};
pub use engine::{EngineStats, RetrievalEngine, SearchError, SearchOptions};
pub use matches::{SearchResult, VerseMatch};
pub use render::{render_search_result, render_statistics, render_verses};
pub use reranker::{length_factor, Reranker, MAX_KEYWORD_BOOST, TOKEN_BOOST};
