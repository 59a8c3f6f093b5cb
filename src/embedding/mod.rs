/// Embedding & vector indexing
///
/// Architecture:
/// - EmbeddingProvider trait for abstraction
/// - FastEmbedProvider for local embedding (all-MiniLM-L6-v2, 384-dim)
/// - HashEmbeddingProvider for model-free, deterministic runs
/// - VectorIndex trait with HNSW and exhaustive implementations
/// - CorpusIndexer to embed the corpus in batches
mod hash;
mod indexer;
mod provider;
mod vector_index;

pub use hash::HashEmbeddingProvider;
pub use indexer::{CorpusIndexer, IndexingReport};
pub use provider::{
    cosine_similarity, max_similarity, EmbeddingError, EmbeddingProvider, FastEmbedProvider,
};
pub use vector_index::{FlatVectorIndex, HnswVectorIndex, Neighbor, VectorIndex, VectorIndexError};

use std::sync::Arc;

/// Model name that selects the hashing provider instead of a neural model
pub const HASH_MODEL: &str = "hash";

/// Build the provider named by configuration
///
/// `dimension` is only used by the hashing provider; neural models have a
/// fixed dimension.
pub fn build_provider(
    model: &str,
    dimension: usize,
) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
    if model.eq_ignore_ascii_case(HASH_MODEL) {
        return Ok(Arc::new(HashEmbeddingProvider::new(dimension)?));
    }
    Ok(Arc::new(FastEmbedProvider::new(model)?))
}
