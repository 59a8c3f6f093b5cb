//! Immutable cache of prototype embeddings

use crate::embedding::{max_similarity, EmbeddingError, EmbeddingProvider};

/// Embeddings of one labelled phrase set
///
/// Built once at classifier construction and only read afterwards.
#[derive(Debug, Clone)]
pub struct PrototypeSet {
    label: String,
    vectors: Vec<Vec<f32>>,
}

impl PrototypeSet {
    pub fn build(
        label: impl Into<String>,
        phrases: &[String],
        provider: &dyn EmbeddingProvider,
    ) -> Result<Self, EmbeddingError> {
        let phrases: Vec<String> = phrases
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        let vectors = if phrases.is_empty() {
            Vec::new()
        } else {
            provider.embed_batch(&phrases)?
        };

        Ok(Self {
            label: label.into(),
            vectors,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Best cosine similarity of `query` against this set; 0.0 when empty
    pub fn score(&self, query: &[f32]) -> f32 {
        max_similarity(query, &self.vectors)
    }
}
